//! Dashboard state.
//!
//! Owned by the UI thread only; the event loop feeds it [`UiEvent`]s and the
//! renderer reads it. No supervisor calls happen here, this module is pure
//! state so it stays unit-testable without a terminal.

use rndash_core::env::RnEnvironment;
use rndash_core::logs::{LogRecord, LogSource};
use rndash_core::process::{ProcessSlot, ProcessStatus};

use crate::events::UiEvent;
use crate::git::GitSummary;
use crate::i18n::Locale;
use crate::prefs::{self, LogLayout, Prefs};

/// Bound on each log store; oldest records are dropped past this.
const MAX_RECORDS: usize = 2000;

/// The four log panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChannel {
    System,
    Bundler,
    Build,
    Device,
}

impl LogChannel {
    pub const ALL: [Self; 4] = [Self::System, Self::Bundler, Self::Build, Self::Device];

    #[must_use]
    pub const fn title(self, locale: &Locale) -> &'static str {
        match self {
            Self::System => locale.logs.system,
            Self::Bundler => locale.logs.bundler,
            Self::Build => locale.logs.build,
            Self::Device => locale.logs.device,
        }
    }
}

/// Which region of the dashboard has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Status,
    Logs,
    Keys,
}

impl FocusPanel {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Status => Self::Logs,
            Self::Logs => Self::Keys,
            Self::Keys => Self::Status,
        }
    }
}

/// Pending confirmation modal, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    FullReset,
    Quit,
}

/// Last reported state of a visible slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotView {
    pub status: ProcessStatus,
    pub pid: Option<u32>,
}

pub struct UiState {
    pub env: RnEnvironment,
    pub locale: &'static Locale,
    pub git: GitSummary,

    pub bundler: SlotView,
    pub android: SlotView,
    pub ios: SlotView,

    pub system_logs: Vec<LogRecord>,
    pub bundler_logs: Vec<LogRecord>,
    pub build_logs: Vec<LogRecord>,
    pub device_logs: Vec<LogRecord>,

    pub show_system: bool,
    pub show_bundler: bool,
    pub show_build: bool,
    pub show_device: bool,

    pub layout: LogLayout,
    pub focus: FocusPanel,
    pub focused_key: usize,
    pub focused_channel: LogChannel,
    pub log_offset: usize,
    pub confirmation: Option<Confirmation>,
}

impl UiState {
    #[must_use]
    pub fn new(env: RnEnvironment, locale: &'static Locale) -> Self {
        let prefs = prefs::load();
        Self {
            env,
            locale,
            git: GitSummary::default(),
            bundler: SlotView::default(),
            android: SlotView::default(),
            ios: SlotView::default(),
            system_logs: Vec::new(),
            bundler_logs: Vec::new(),
            build_logs: Vec::new(),
            device_logs: Vec::new(),
            show_system: true,
            show_bundler: false,
            show_build: false,
            show_device: false,
            layout: prefs.log_layout,
            focus: FocusPanel::Keys,
            focused_key: 0,
            focused_channel: LogChannel::System,
            log_offset: 0,
            confirmation: None,
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(record) => {
                let store = match record.source {
                    LogSource::System => &mut self.system_logs,
                    LogSource::Bundler => &mut self.bundler_logs,
                    LogSource::Android | LogSource::Ios => &mut self.build_logs,
                };
                push_capped(store, record);
            }
            UiEvent::DeviceLog(record) => push_capped(&mut self.device_logs, record),
            UiEvent::Status { slot, status, pid } => {
                let view = match slot {
                    ProcessSlot::Bundler => &mut self.bundler,
                    ProcessSlot::Android => &mut self.android,
                    ProcessSlot::Ios => &mut self.ios,
                    ProcessSlot::DeviceLogs => return,
                };
                view.status = status;
                view.pid = pid;
            }
            UiEvent::Git(summary) => self.git = summary,
        }
    }

    #[must_use]
    pub fn logs_of(&self, channel: LogChannel) -> &[LogRecord] {
        match channel {
            LogChannel::System => &self.system_logs,
            LogChannel::Bundler => &self.bundler_logs,
            LogChannel::Build => &self.build_logs,
            LogChannel::Device => &self.device_logs,
        }
    }

    #[must_use]
    pub const fn is_shown(&self, channel: LogChannel) -> bool {
        match channel {
            LogChannel::System => self.show_system,
            LogChannel::Bundler => self.show_bundler,
            LogChannel::Build => self.show_build,
            LogChannel::Device => self.show_device,
        }
    }

    pub fn toggle(&mut self, channel: LogChannel) {
        let flag = match channel {
            LogChannel::System => &mut self.show_system,
            LogChannel::Bundler => &mut self.show_bundler,
            LogChannel::Build => &mut self.show_build,
            LogChannel::Device => &mut self.show_device,
        };
        *flag = !*flag;
    }

    #[must_use]
    pub fn visible_channels(&self) -> Vec<LogChannel> {
        LogChannel::ALL
            .into_iter()
            .filter(|channel| self.is_shown(*channel))
            .collect()
    }

    /// Cycle the panel arrangement and persist the choice.
    pub fn cycle_layout(&mut self) {
        self.layout = self.layout.next();
        prefs::save(&Prefs {
            log_layout: self.layout,
        });
    }

    /// Scroll the focused channel; offset 0 pins to the newest line.
    pub fn scroll(&mut self, up: bool, max_visible: usize) {
        let total = self.logs_of(self.focused_channel).len();
        let max_offset = total.saturating_sub(max_visible);
        if up {
            self.log_offset = (self.log_offset + 1).min(max_offset);
        } else {
            self.log_offset = self.log_offset.saturating_sub(1);
        }
    }

    pub fn focus_channel(&mut self, channel: LogChannel) {
        self.focused_channel = channel;
        self.log_offset = 0;
    }

    /// A fresh bundler run makes the old output noise; drop it.
    pub fn clear_bundler_logs(&mut self) {
        self.bundler_logs.clear();
        if self.focused_channel == LogChannel::Bundler {
            self.log_offset = 0;
        }
    }

    /// Full reset invalidates everything but the system narrative.
    pub fn clear_process_logs(&mut self) {
        self.bundler_logs.clear();
        self.build_logs.clear();
        self.device_logs.clear();
        self.log_offset = 0;
    }

    /// Record a UI-originated narrative line (modal cancellations and the
    /// like, which never pass through the supervisor).
    pub fn note(&mut self, text: &str) {
        push_capped(
            &mut self.system_logs,
            LogRecord::system(rndash_core::logs::LogLevel::Info, text),
        );
    }
}

fn push_capped(store: &mut Vec<LogRecord>, record: LogRecord) {
    store.push(record);
    if store.len() > MAX_RECORDS {
        let excess = store.len() - MAX_RECORDS;
        store.drain(0..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rndash_core::env::PackageManager;
    use rndash_core::logs::LogLevel;
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

    fn record(source: LogSource, text: &str) -> LogRecord {
        LogRecord::new(source, LogLevel::Info, text)
    }

    #[test]
    fn logs_route_by_source() {
        let mut state = test_state();
        state.apply(UiEvent::Log(record(LogSource::System, "sys")));
        state.apply(UiEvent::Log(record(LogSource::Bundler, "metro")));
        state.apply(UiEvent::Log(record(LogSource::Android, "gradle")));
        state.apply(UiEvent::Log(record(LogSource::Ios, "xcode")));

        assert_eq!(state.system_logs.len(), 1);
        assert_eq!(state.bundler_logs.len(), 1);
        assert_eq!(state.build_logs.len(), 2);
        assert!(state.device_logs.is_empty());
    }

    #[test]
    fn device_lines_land_in_the_device_channel() {
        let mut state = test_state();
        state.apply(UiEvent::DeviceLog(record(LogSource::Android, "logcat")));
        assert!(state.build_logs.is_empty());
        assert_eq!(state.device_logs.len(), 1);
    }

    #[test]
    fn status_updates_the_right_slot_and_ignores_device_logs() {
        let mut state = test_state();
        state.apply(UiEvent::Status {
            slot: ProcessSlot::Bundler,
            status: ProcessStatus::Running,
            pid: Some(99),
        });
        state.apply(UiEvent::Status {
            slot: ProcessSlot::DeviceLogs,
            status: ProcessStatus::Error,
            pid: None,
        });

        assert_eq!(state.bundler.status, ProcessStatus::Running);
        assert_eq!(state.bundler.pid, Some(99));
        assert_eq!(state.android.status, ProcessStatus::Idle);
    }

    #[test]
    fn scroll_clamps_to_history_bounds() {
        let mut state = test_state();
        for i in 0..10 {
            state.apply(UiEvent::Log(record(LogSource::System, &format!("line {i}"))));
        }

        for _ in 0..100 {
            state.scroll(true, 4);
        }
        assert_eq!(state.log_offset, 6);

        for _ in 0..100 {
            state.scroll(false, 4);
        }
        assert_eq!(state.log_offset, 0);
    }

    #[test]
    fn log_stores_are_capped() {
        let mut state = test_state();
        for i in 0..(MAX_RECORDS + 50) {
            state.apply(UiEvent::Log(record(LogSource::Bundler, &format!("{i}"))));
        }
        assert_eq!(state.bundler_logs.len(), MAX_RECORDS);
        assert_eq!(state.bundler_logs[0].text, "50");
    }

    #[test]
    fn toggles_flip_visibility() {
        let mut state = test_state();
        assert!(state.is_shown(LogChannel::System));
        state.toggle(LogChannel::System);
        assert!(!state.is_shown(LogChannel::System));
        state.toggle(LogChannel::Device);
        assert_eq!(state.visible_channels(), vec![LogChannel::Device]);
    }
}
