//! Header: project environment on the left, process status in the center,
//! identity and layout badge on the right.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use rndash_core::process::ProcessStatus;

use crate::app::{FocusPanel, SlotView, UiState};

const LABEL_STYLE: Style = Style::new().fg(Color::Gray);

fn shorten_path(path: &Path) -> String {
    let full = path.display().to_string();
    match dirs::home_dir() {
        Some(home) => {
            let home = home.display().to_string();
            full.strip_prefix(&home)
                .map_or(full.clone(), |rest| format!("~{rest}"))
        }
        None => full,
    }
}

fn info_line(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8}: "), LABEL_STYLE),
        value,
    ])
}

pub fn render(frame: &mut Frame, area: Rect, state: &UiState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
        ])
        .split(area);

    render_env(frame, columns[0], state);
    render_status(frame, columns[1], state);
    render_identity(frame, columns[2], state);
}

fn render_env(frame: &mut Frame, area: Rect, state: &UiState) {
    let labels = &state.locale.header;
    let git = &state.git;

    let diff_value = if git.changed_files > 0 {
        let mut spans = vec![Span::styled(
            format!("{} files ", git.changed_files),
            Style::default().fg(Color::Gray),
        )];
        if git.additions > 0 {
            spans.push(Span::styled(
                format!("+{} ", git.additions),
                Style::default().fg(Color::Green),
            ));
        }
        if git.deletions > 0 {
            spans.push(Span::styled(
                format!("-{}", git.deletions),
                Style::default().fg(Color::Red),
            ));
        }
        Line::from(
            std::iter::once(Span::styled(
                format!("{:<8}: ", labels.diff),
                LABEL_STYLE,
            ))
            .chain(spans)
            .collect::<Vec<_>>(),
        )
    } else {
        info_line(
            labels.diff,
            Span::styled(labels.diff_clean, Style::default().fg(Color::Gray)),
        )
    };

    let pkg = if state.env.is_monorepo {
        format!(
            "{} · {}",
            state.env.package_manager.name(),
            labels.monorepo
        )
    } else {
        state.env.package_manager.name().to_string()
    };

    let lines = vec![
        info_line(
            labels.node,
            Span::styled(
                state.env.node_version.clone().unwrap_or_else(|| "n/a".into()),
                Style::default().fg(Color::Cyan),
            ),
        ),
        info_line(
            labels.path,
            Span::raw(shorten_path(&state.env.app_root)),
        ),
        info_line(
            labels.branch,
            Span::styled(
                git.branch.clone().unwrap_or_else(|| "n/a".into()),
                Style::default().fg(Color::Green),
            ),
        ),
        diff_value,
        info_line(
            labels.pkg_mgr,
            Span::styled(pkg, Style::default().fg(Color::LightRed)),
        ),
    ];

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_glyph(status: ProcessStatus) -> (&'static str, Color) {
    match status {
        ProcessStatus::Running => ("●", Color::Green),
        ProcessStatus::Building => ("◌", Color::Yellow),
        ProcessStatus::Error => ("●", Color::Red),
        ProcessStatus::Detached => ("●", Color::Cyan),
        ProcessStatus::Idle => ("○", Color::Gray),
    }
}

fn status_label(state: &UiState, status: ProcessStatus) -> &'static str {
    let labels = &state.locale.status;
    match status {
        ProcessStatus::Idle => labels.idle,
        ProcessStatus::Building => labels.building,
        ProcessStatus::Running => labels.running,
        ProcessStatus::Error => labels.error,
        ProcessStatus::Detached => labels.detached,
    }
}

fn status_row(state: &UiState, label: &str, view: SlotView) -> Line<'static> {
    let (glyph, color) = status_glyph(view.status);
    let mut style = Style::default().fg(color);
    if view.status == ProcessStatus::Running {
        style = style.add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(format!("{label:<9}"), LABEL_STYLE),
        Span::styled(format!("{glyph} "), Style::default().fg(color)),
        Span::styled(status_label(state, view.status), style),
    ];
    if let Some(pid) = view.pid {
        if view.status.is_live() {
            spans.push(Span::styled(
                format!("  ({pid})"),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    Line::from(spans)
}

fn render_status(frame: &mut Frame, area: Rect, state: &UiState) {
    let labels = &state.locale.status;
    let lines = vec![
        Line::from(Span::styled(
            labels.title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        status_row(state, labels.metro, state.bundler),
        status_row(state, labels.android, state.android),
        status_row(state, labels.ios, state.ios),
    ];

    let border = if state.focus == FocusPanel::Status {
        Color::Cyan
    } else {
        Color::Blue
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_identity(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines = vec![
        Line::from(Span::styled(
            "rndash",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                state.layout.badge(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  V", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(ratatui::layout::Alignment::Right)
            .block(block),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rndash_core::env::{PackageManager, RnEnvironment};
    use std::path::PathBuf;

    fn test_state() -> UiState {
        UiState::new(
            RnEnvironment {
                package_manager: PackageManager::Npm,
                is_monorepo: false,
                project_root: PathBuf::from("/tmp/app"),
                app_root: PathBuf::from("/tmp/app"),
                node_version: None,
            },
            &crate::i18n::EN,
        )
    }

    fn rendered(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn only_live_slots_show_their_pid() {
        let state = test_state();
        let row = |status, pid| rendered(&status_row(&state, "metro", SlotView { status, pid }));

        assert!(row(ProcessStatus::Running, Some(42)).contains("(42)"));
        assert!(row(ProcessStatus::Detached, Some(7)).contains("(7)"));
        assert!(row(ProcessStatus::Building, Some(9)).contains("(9)"));
        assert!(!row(ProcessStatus::Error, Some(42)).contains("(42)"));
        assert!(!row(ProcessStatus::Idle, None).contains('('));
    }
}
