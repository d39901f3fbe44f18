//! Channel-backed observer bridging the supervisor to the UI thread.
//!
//! Supervisor callbacks fire on tokio tasks; the dashboard loop runs on its
//! own thread and drains this channel between frames. Send failures mean
//! the UI is gone, which is fine, the supervisor outcome does not depend on
//! anyone listening.

use tokio::sync::mpsc::UnboundedSender;

use rndash_core::events::SupervisorEvents;
use rndash_core::logs::LogRecord;
use rndash_core::process::{ProcessSlot, ProcessStatus};

use crate::git::GitSummary;

/// Everything the dashboard reacts to between frames.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Log(LogRecord),
    DeviceLog(LogRecord),
    Status {
        slot: ProcessSlot,
        status: ProcessStatus,
        pid: Option<u32>,
    },
    Git(GitSummary),
}

/// [`SupervisorEvents`] adapter that forwards everything to the UI channel.
pub struct ChannelEvents {
    tx: UnboundedSender<UiEvent>,
}

impl ChannelEvents {
    #[must_use]
    pub const fn new(tx: UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }
}

impl SupervisorEvents for ChannelEvents {
    fn log(&self, record: &LogRecord) {
        let _ = self.tx.send(UiEvent::Log(record.clone()));
    }

    fn device_log(&self, record: &LogRecord) {
        let _ = self.tx.send(UiEvent::DeviceLog(record.clone()));
    }

    fn status(&self, slot: ProcessSlot, status: ProcessStatus, pid: Option<u32>) {
        let _ = self.tx.send(UiEvent::Status { slot, status, pid });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rndash_core::logs::{LogLevel, LogSource};
    use tokio::sync::mpsc;

    #[test]
    fn events_arrive_in_emission_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let events = ChannelEvents::new(tx);

        events.status(ProcessSlot::Bundler, ProcessStatus::Building, None);
        events.log(&LogRecord::system(LogLevel::Info, "starting metro..."));
        events.status(ProcessSlot::Bundler, ProcessStatus::Running, Some(7));

        assert!(matches!(
            rx.try_recv().unwrap(),
            UiEvent::Status {
                status: ProcessStatus::Building,
                ..
            }
        ));
        assert!(matches!(rx.try_recv().unwrap(), UiEvent::Log(_)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            UiEvent::Status {
                pid: Some(7),
                ..
            }
        ));
    }

    #[test]
    fn device_lines_use_their_own_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let events = ChannelEvents::new(tx);

        events.device_log(&LogRecord::new(LogSource::Android, LogLevel::Info, "logcat"));
        assert!(matches!(rx.try_recv().unwrap(), UiEvent::DeviceLog(_)));
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let events = ChannelEvents::new(tx);
        events.log(&LogRecord::system(LogLevel::Info, "nobody listening"));
    }
}
