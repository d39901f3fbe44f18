//! Centered confirmation modal for the two destructive flows: full reset
//! and quit (with the option to detach the bundler first).

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::{Confirmation, UiState};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}

pub fn render(frame: &mut Frame, confirmation: Confirmation, state: &UiState) {
    let area = centered(frame.area(), 64, 7);
    frame.render_widget(Clear, area);

    let (block, lines) = match confirmation {
        Confirmation::Quit => {
            let modal = &state.locale.quit_modal;
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Blue));
            let lines = vec![
                Line::from(Span::styled(
                    modal.title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(modal.message),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        modal.detach_label,
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(modal.detach_desc),
                    Span::styled(
                        modal.quit_label,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(modal.quit_desc),
                ]),
            ];
            (block, lines)
        }
        Confirmation::FullReset => {
            let modal = &state.locale.reset_modal;
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::Red));
            let lines = vec![
                Line::from(Span::styled(
                    modal.title,
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    modal.message,
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        modal.confirm_label,
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(modal.confirm_desc),
                    Span::styled(
                        modal.cancel_label,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(modal.cancel_desc),
                ]),
            ];
            (block, lines)
        }
    };

    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(body, area);
}
