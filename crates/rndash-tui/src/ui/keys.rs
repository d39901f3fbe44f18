//! Bottom keybindings bar. Hints double as a menu: with the bar focused,
//! left/right move the highlight and enter fires the highlighted action.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use rndash_core::process::ProcessStatus;

use crate::app::{FocusPanel, UiState};
use crate::dashboard::{Action, NavAction};

pub fn render(frame: &mut Frame, area: Rect, state: &UiState, actions: &[NavAction]) {
    let focused = state.focus == FocusPanel::Keys;
    let metro_running = state.bundler.status == ProcessStatus::Running;

    let mut spans: Vec<Span> = Vec::with_capacity(actions.len() * 3);
    for (idx, action) in actions.iter().enumerate() {
        let active = focused && idx == state.focused_key;
        let disabled = action.action == Action::Start && metro_running;

        let key_style = if active {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        };
        let label_style = if active {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(format!("[{}]", action.key), key_style));
        spans.push(Span::styled(format!(" {}", action.label), label_style));
        spans.push(Span::raw("  "));
    }

    let border = if focused { Color::Cyan } else { Color::Blue };
    let bar = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(bar, area);
}
