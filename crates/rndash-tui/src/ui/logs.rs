//! Log panels in their three arrangements: grid (two per row), rows
//! (stacked) and merged (one panel, channels interleaved by timestamp).

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use rndash_core::logs::{LogLevel, LogRecord, LogSource};

use crate::app::{FocusPanel, LogChannel, UiState};
use crate::prefs::LogLayout;

const fn source_color(source: LogSource) -> Color {
    match source {
        LogSource::Bundler => Color::Blue,
        LogSource::Android => Color::Green,
        LogSource::Ios => Color::LightBlue,
        LogSource::System => Color::Cyan,
    }
}

const fn source_tag(source: LogSource) -> &'static str {
    match source {
        LogSource::Bundler => "[metro  ]",
        LogSource::Android => "[android]",
        LogSource::Ios => "[ios    ]",
        LogSource::System => "[system ]",
    }
}

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Info => Style::default().fg(Color::White),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red),
    }
}

fn record_line(record: &LogRecord) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            format!("{} ", source_tag(record.source)),
            Style::default().fg(source_color(record.source)),
        ),
        Span::styled(record.text.as_str(), level_style(record.level)),
    ])
}

/// Window of records to show: the newest `max_lines`, shifted back by
/// `offset` when the user scrolled.
fn window(records: &[LogRecord], max_lines: usize, offset: usize) -> &[LogRecord] {
    let end = records.len().saturating_sub(offset);
    let start = end.saturating_sub(max_lines);
    &records[start..end]
}

pub fn render(frame: &mut Frame, area: Rect, state: &UiState) {
    let channels = state.visible_channels();
    if channels.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let hint = Paragraph::new(Span::styled(
            format!("({})", state.locale.logs.hidden),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    match state.layout {
        LogLayout::Merged => render_merged(frame, area, state, &channels),
        LogLayout::Rows => {
            let constraints = vec![Constraint::Ratio(1, channels.len() as u32); channels.len()];
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(constraints)
                .split(area);
            for (channel, row) in channels.iter().zip(rows.iter()) {
                render_channel(frame, *row, state, *channel);
            }
        }
        LogLayout::Grid => {
            let row_count = channels.len().div_ceil(2);
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
                .split(area);
            for (pair, row) in channels.chunks(2).zip(rows.iter()) {
                if pair.len() == 1 {
                    render_channel(frame, *row, state, pair[0]);
                    continue;
                }
                let cells = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(*row);
                render_channel(frame, cells[0], state, pair[0]);
                render_channel(frame, cells[1], state, pair[1]);
            }
        }
    }
}

fn panel_block(state: &UiState, channel: LogChannel, len: usize) -> Block<'static> {
    let focused = state.focus == FocusPanel::Logs && state.focused_channel == channel;
    let border = if focused { Color::Cyan } else { Color::Blue };
    let title_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ({len}) ", channel.title(state.locale)),
            title_style,
        ))
}

fn render_channel(frame: &mut Frame, area: Rect, state: &UiState, channel: LogChannel) {
    let records = state.logs_of(channel);
    let max_lines = usize::from(area.height.saturating_sub(2)).max(1);
    let offset = if state.focus == FocusPanel::Logs && state.focused_channel == channel {
        state.log_offset
    } else {
        0
    };

    let lines: Vec<Line> = if records.is_empty() {
        vec![Line::from(Span::styled(
            state.locale.logs.empty,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        window(records, max_lines, offset)
            .iter()
            .map(record_line)
            .collect()
    };

    let block = panel_block(state, channel, records.len());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_merged(frame: &mut Frame, area: Rect, state: &UiState, channels: &[LogChannel]) {
    let mut merged: Vec<&LogRecord> = channels
        .iter()
        .flat_map(|channel| state.logs_of(*channel).iter())
        .collect();
    merged.sort_by_key(|record| record.timestamp);

    let max_lines = usize::from(area.height.saturating_sub(2)).max(1);
    let offset = if state.focus == FocusPanel::Logs {
        state.log_offset
    } else {
        0
    };
    let end = merged.len().saturating_sub(offset);
    let start = end.saturating_sub(max_lines);

    let lines: Vec<Line> = if merged.is_empty() {
        vec![Line::from(Span::styled(
            state.locale.logs.empty,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        merged[start..end].iter().map(|r| record_line(r)).collect()
    };

    let focused = state.focus == FocusPanel::Logs;
    let border = if focused { Color::Cyan } else { Color::Blue };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" logs ({}) ", merged.len()),
            Style::default().fg(Color::Cyan),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
