//! Log record types emitted by the supervisor and the output relay.
//!
//! Records are append-only facts: they are never mutated or deduplicated,
//! and per-source emission order matches the line order of the underlying
//! stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process::Platform;

/// Where a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Bundler,
    Android,
    Ios,
    /// Narrative messages from the supervisor itself ("stopping metro...").
    System,
}

impl From<Platform> for LogSource {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self::Android,
            Platform::Ios => Self::Ios,
        }
    }
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A single immutable log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub source: LogSource,
    pub level: LogLevel,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(source: LogSource, level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            source,
            level,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Convenience constructor for supervisor narrative messages.
    pub fn system(level: LogLevel, text: impl Into<String>) -> Self {
        Self::new(LogSource::System, level, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_records_carry_system_source() {
        let record = LogRecord::system(LogLevel::Warn, "about to do something drastic");
        assert_eq!(record.source, LogSource::System);
        assert_eq!(record.level, LogLevel::Warn);
    }

    #[test]
    fn platform_converts_to_source() {
        assert_eq!(LogSource::from(Platform::Android), LogSource::Android);
        assert_eq!(LogSource::from(Platform::Ios), LogSource::Ios);
    }
}
