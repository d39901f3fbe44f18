//! The dashboard event loop.
//!
//! Runs on a dedicated thread so terminal I/O never blocks the tokio
//! runtime; supervisor commands are synchronous calls made from here, the
//! two long-running ones (install, full reset) are handed to the runtime.
//! Between frames the loop drains the UI event channel, redraws on a fixed
//! tick and polls input with a short timeout.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

use rndash_core::env::RnEnvironment;
use rndash_core::process::Platform;
use rndash_runtime::Supervisor;

use crate::app::{Confirmation, FocusPanel, LogChannel, UiState};
use crate::events::UiEvent;
use crate::i18n::Locale;
use crate::ui;

const TICK_RATE: Duration = Duration::from_millis(100);
const INPUT_POLL: Duration = Duration::from_millis(10);

/// What a key press does to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

/// A supervisor or UI command reachable from the keybindings bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Reload,
    BuildAndroid,
    BuildIos,
    StopAll,
    Install,
    KillOrphans,
    FreshCache,
    FullReset,
    ToggleSystem,
    ToggleBundler,
    ToggleBuild,
    ToggleDevice,
    CycleLayout,
    Quit,
}

/// One entry of the keybindings bar.
pub struct NavAction {
    pub key: &'static str,
    pub label: &'static str,
    pub action: Action,
}

fn nav_actions(locale: &'static Locale) -> Vec<NavAction> {
    let keys = &locale.keys;
    vec![
        NavAction { key: "s", label: keys.start, action: Action::Start },
        NavAction { key: "r", label: keys.reload, action: Action::Reload },
        NavAction { key: "a", label: keys.android, action: Action::BuildAndroid },
        NavAction { key: "i", label: keys.ios, action: Action::BuildIos },
        NavAction { key: "x", label: keys.stop, action: Action::StopAll },
        NavAction { key: "I", label: keys.install, action: Action::Install },
        NavAction { key: "K", label: keys.kill_orphans, action: Action::KillOrphans },
        NavAction { key: "F5", label: keys.reset, action: Action::FreshCache },
        NavAction { key: "^F5", label: keys.full_reset, action: Action::FullReset },
        NavAction { key: "l", label: keys.system_logs, action: Action::ToggleSystem },
        NavAction { key: "m", label: keys.bundler_logs, action: Action::ToggleBundler },
        NavAction { key: "d", label: keys.build_logs, action: Action::ToggleBuild },
        NavAction { key: "e", label: keys.device_logs, action: Action::ToggleDevice },
        NavAction { key: "V", label: keys.toggle_view, action: Action::CycleLayout },
        NavAction { key: "q", label: keys.quit, action: Action::Quit },
    ]
}

/// Run the dashboard until the user quits. Blocking; call from a dedicated
/// thread.
pub fn run(
    supervisor: &Arc<Supervisor>,
    handle: &Handle,
    env: RnEnvironment,
    locale: &'static Locale,
    mut rx: UnboundedReceiver<UiEvent>,
) -> Result<()> {
    // Supervisor commands spawn relay and monitor tasks, so this thread
    // must be inside the runtime context.
    let _runtime = handle.enter();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(env, locale);
    let actions = nav_actions(locale);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = rx.try_recv() {
            state.apply(ev);
        }

        if last_tick.elapsed() >= TICK_RATE {
            terminal.draw(|f| ui::draw(f, &state, &actions)).ok();
            last_tick = Instant::now();
        }

        if event::poll(INPUT_POLL).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(supervisor, handle, &mut state, &actions, key) == Control::Quit {
                    break Ok(());
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn handle_key(
    supervisor: &Arc<Supervisor>,
    handle: &Handle,
    state: &mut UiState,
    actions: &[NavAction],
    key: KeyEvent,
) -> Control {
    if key.code == KeyCode::Tab {
        state.focus = state.focus.next();
        return Control::Continue;
    }

    if let Some(confirmation) = state.confirmation {
        return handle_modal(supervisor, handle, state, confirmation, key);
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.confirmation = Some(Confirmation::Quit);
        return Control::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return perform(supervisor, handle, state, Action::Quit),
        KeyCode::Char('s') => return perform(supervisor, handle, state, Action::Start),
        KeyCode::Char('r') => return perform(supervisor, handle, state, Action::Reload),
        KeyCode::Char('a') => return perform(supervisor, handle, state, Action::BuildAndroid),
        KeyCode::Char('i') => return perform(supervisor, handle, state, Action::BuildIos),
        KeyCode::Char('x') => return perform(supervisor, handle, state, Action::StopAll),
        KeyCode::Char('I') => return perform(supervisor, handle, state, Action::Install),
        KeyCode::Char('K') => return perform(supervisor, handle, state, Action::KillOrphans),
        KeyCode::Char('l') => return perform(supervisor, handle, state, Action::ToggleSystem),
        KeyCode::Char('m') => return perform(supervisor, handle, state, Action::ToggleBundler),
        KeyCode::Char('d') => return perform(supervisor, handle, state, Action::ToggleBuild),
        KeyCode::Char('e') => return perform(supervisor, handle, state, Action::ToggleDevice),
        KeyCode::Char('V') => return perform(supervisor, handle, state, Action::CycleLayout),
        KeyCode::F(5) => {
            let action = if key.modifiers.contains(KeyModifiers::CONTROL) {
                Action::FullReset
            } else {
                Action::FreshCache
            };
            return perform(supervisor, handle, state, action);
        }
        _ => {}
    }

    if state.focus == FocusPanel::Logs {
        match key.code {
            KeyCode::Up => {
                state.scroll(true, visible_log_lines());
                return Control::Continue;
            }
            KeyCode::Down => {
                state.scroll(false, visible_log_lines());
                return Control::Continue;
            }
            KeyCode::Char('1') => state.focus_channel(LogChannel::System),
            KeyCode::Char('2') => state.focus_channel(LogChannel::Bundler),
            KeyCode::Char('3') => state.focus_channel(LogChannel::Build),
            KeyCode::Char('4') => state.focus_channel(LogChannel::Device),
            _ => {}
        }
        return Control::Continue;
    }

    if state.focus == FocusPanel::Keys {
        match key.code {
            KeyCode::Left => state.focused_key = state.focused_key.saturating_sub(1),
            KeyCode::Right => {
                state.focused_key = (state.focused_key + 1).min(actions.len() - 1);
            }
            KeyCode::Enter => {
                let action = actions[state.focused_key].action;
                return perform(supervisor, handle, state, action);
            }
            _ => {}
        }
    }

    Control::Continue
}

fn handle_modal(
    supervisor: &Arc<Supervisor>,
    handle: &Handle,
    state: &mut UiState,
    confirmation: Confirmation,
    key: KeyEvent,
) -> Control {
    match confirmation {
        Confirmation::Quit => match key.code {
            KeyCode::Char('d' | 'D') => {
                supervisor.detach_bundler();
                supervisor.stop_all();
                Control::Quit
            }
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => {
                supervisor.stop_all();
                Control::Quit
            }
            _ => Control::Continue,
        },
        Confirmation::FullReset => match key.code {
            KeyCode::Char('y' | 'Y' | 's' | 'S') => {
                state.confirmation = None;
                let sup = Arc::clone(supervisor);
                handle.spawn(async move { sup.full_reset().await });
                Control::Continue
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                state.confirmation = None;
                state.note(state.locale.reset_modal.cancelled);
                Control::Continue
            }
            _ => Control::Continue,
        },
    }
}

fn perform(
    supervisor: &Arc<Supervisor>,
    handle: &Handle,
    state: &mut UiState,
    action: Action,
) -> Control {
    match action {
        Action::Start => {
            state.clear_bundler_logs();
            supervisor.start_bundler(false);
        }
        Action::Reload => {
            state.clear_bundler_logs();
            supervisor.restart_bundler(false);
        }
        Action::FreshCache => {
            state.clear_bundler_logs();
            supervisor.restart_bundler(true);
        }
        Action::BuildAndroid => supervisor.run_build(Platform::Android),
        Action::BuildIos => supervisor.run_build(Platform::Ios),
        Action::StopAll => supervisor.stop_all(),
        Action::Install => {
            state.clear_bundler_logs();
            let sup = Arc::clone(supervisor);
            handle.spawn(async move {
                sup.run_install().await;
            });
        }
        Action::KillOrphans => {
            supervisor.kill_orphans();
        }
        Action::FullReset => {
            state.clear_process_logs();
            state.confirmation = Some(Confirmation::FullReset);
        }
        Action::ToggleSystem => state.toggle(LogChannel::System),
        Action::ToggleBundler => state.toggle(LogChannel::Bundler),
        Action::ToggleBuild => state.toggle(LogChannel::Build),
        Action::ToggleDevice => state.toggle(LogChannel::Device),
        Action::CycleLayout => state.cycle_layout(),
        Action::Quit => state.confirmation = Some(Confirmation::Quit),
    }
    Control::Continue
}

/// Rough count of log lines on screen, for scroll clamping.
fn visible_log_lines() -> usize {
    let rows = crossterm::terminal::size().map_or(24, |(_, rows)| rows);
    usize::from(rows.saturating_sub(12)).max(3)
}
