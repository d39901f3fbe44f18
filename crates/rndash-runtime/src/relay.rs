//! Output relay: child stream to log records.
//!
//! Takes a spawned child's stdout and stderr, splits each into lines on a
//! dedicated task, and forwards every line as a [`LogRecord`] tagged with
//! its source. stdout lines are `Info`, stderr lines are `Error`, matching
//! how the streams are conventionally used by the React Native CLI.
//!
//! Per-stream line order is preserved because each stream has exactly one
//! reader task; no ordering is promised across streams.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tracing::debug;

use rndash_core::events::SupervisorEvents;
use rndash_core::logs::{LogLevel, LogRecord, LogSource};

#[derive(Debug, Clone, Copy)]
enum Sink {
    Main,
    Device,
}

/// Attach line-relay tasks to a child's standard streams.
///
/// Takes the stream handles out of `child`; the tasks run until their
/// stream closes and need no further management.
pub fn attach(child: &mut Child, source: LogSource, events: &Arc<dyn SupervisorEvents>) {
    spawn_readers(child, source, events, Sink::Main);
}

/// Like [`attach`], but lines are delivered through the observer's
/// `device_log` channel so device stream output stays separable from
/// build output of the same platform source.
pub fn attach_device(child: &mut Child, source: LogSource, events: &Arc<dyn SupervisorEvents>) {
    spawn_readers(child, source, events, Sink::Device);
}

fn spawn_readers(child: &mut Child, source: LogSource, events: &Arc<dyn SupervisorEvents>, sink: Sink) {
    if let Some(stdout) = child.stdout.take() {
        let events = Arc::clone(events);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(text)) = lines.next_line().await {
                deliver(&*events, sink, &LogRecord::new(source, LogLevel::Info, text));
            }
            debug!(source = ?source, "stdout relay exiting");
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let events = Arc::clone(events);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(text)) = lines.next_line().await {
                deliver(&*events, sink, &LogRecord::new(source, LogLevel::Error, text));
            }
            debug!(source = ?source, "stderr relay exiting");
        });
    }
}

fn deliver(events: &dyn SupervisorEvents, sink: Sink, record: &LogRecord) {
    match sink {
        Sink::Main => events.log(record),
        Sink::Device => events.device_log(record),
    }
}
