//! Core domain types and port definitions for rndash.
//!
//! This crate holds everything the supervisor core and the terminal adapter
//! share: process slots and statuses, log records, the observer port, path
//! resolution for the per-user data directory, React Native environment
//! detection, and the supervisor configuration.
//!
//! No process or terminal I/O happens here - those concerns live in
//! `rndash-runtime` and `rndash-tui` respectively.

#![deny(unsafe_code)]

pub mod config;
pub mod env;
pub mod events;
pub mod logs;
pub mod paths;
pub mod process;

// Re-export commonly used types for convenience
pub use config::SupervisorConfig;
pub use env::{PackageManager, RnEnvironment, detect_environment};
pub use events::{NoopSupervisorEvents, SupervisorEvents};
pub use logs::{LogLevel, LogRecord, LogSource};
pub use paths::{PathError, data_root, pid_file_path, prefs_path};
pub use process::{Platform, ProcessSlot, ProcessStatus};
