//! Observer port for supervisor lifecycle events.
//!
//! The supervisor core knows nothing about terminals or rendering; it
//! reports everything through this trait and the adapter decides what to do
//! with it.

use crate::logs::LogRecord;
use crate::process::{ProcessSlot, ProcessStatus};

/// Port for observing supervisor activity.
///
/// # Design
///
/// - **Object-safe**: Uses `&self` for dynamic dispatch via `Arc<dyn SupervisorEvents>`
/// - **Fire-and-forget**: Methods don't return `Result` - observers handle
///   their own failures internally
/// - **Ordered**: For a given slot, `status` calls arrive in transition
///   order; for a given log source, `log` calls arrive in line order
///
/// # Example
///
/// ```rust
/// use rndash_core::events::SupervisorEvents;
/// use rndash_core::logs::LogRecord;
/// use rndash_core::process::{ProcessSlot, ProcessStatus};
///
/// struct PrintEvents;
///
/// impl SupervisorEvents for PrintEvents {
///     fn log(&self, record: &LogRecord) {
///         println!("[{:?}] {}", record.level, record.text);
///     }
///     fn status(&self, slot: ProcessSlot, status: ProcessStatus, pid: Option<u32>) {
///         println!("{} -> {:?} (pid {:?})", slot.name(), status, pid);
///     }
/// }
/// ```
pub trait SupervisorEvents: Send + Sync {
    /// Called for every log record, zero or more times per operation.
    fn log(&self, record: &LogRecord);

    /// Called for lines from the auxiliary device log stream. These share
    /// the platform sources with build output, so observers that separate
    /// the two override this; the default folds them into [`Self::log`].
    fn device_log(&self, record: &LogRecord) {
        self.log(record);
    }

    /// Called on every status transition of a supervised slot.
    fn status(&self, slot: ProcessSlot, status: ProcessStatus, pid: Option<u32>);
}

/// No-op implementation for tests and headless contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSupervisorEvents;

impl SupervisorEvents for NoopSupervisorEvents {
    fn log(&self, _record: &LogRecord) {}
    fn status(&self, _slot: ProcessSlot, _status: ProcessStatus, _pid: Option<u32>) {}
}
