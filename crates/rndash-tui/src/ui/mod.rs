//! Frame composition: header on top, log panels in the middle, keybindings
//! bar at the bottom, confirmation modal floating over everything.

mod header;
mod keys;
mod logs;
mod modal;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::UiState;
use crate::dashboard::NavAction;

pub fn draw(frame: &mut Frame, state: &UiState, actions: &[NavAction]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], state);
    logs::render(frame, chunks[1], state);
    keys::render(frame, chunks[2], state, actions);

    if let Some(confirmation) = state.confirmation {
        modal::render(frame, confirmation, state);
    }
}
