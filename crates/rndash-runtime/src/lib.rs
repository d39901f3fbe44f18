//! Process lifecycle supervisor core for rndash.
//!
//! Spawns, tracks, detaches, reattaches and reaps the fixed set of
//! development processes (Metro bundler, the two platform builds, the
//! device log stream) and funnels their output and status transitions to a
//! caller-supplied observer.

#![deny(unsafe_code)]

pub mod orphan;
pub mod pidfile;
pub mod registry;
pub mod relay;
pub mod signal;
pub mod supervisor;

pub use orphan::{OrphanScanner, SystemProcessScanner};
pub use registry::{ProcessRegistry, RegistryError, SlotOwnership};
pub use supervisor::Supervisor;
