//! In-memory process registry.
//!
//! One table mapping each [`ProcessSlot`] to its current ownership plus the
//! last status reported for it. The table owns the invariant "at most one
//! live handle per slot"; for the bundler slot the ownership is a tagged
//! variant, so an owned handle and a detached pid can never coexist.

use std::collections::HashMap;

use thiserror::Error;
use tokio::task::JoinHandle;

use rndash_core::process::{ProcessSlot, ProcessStatus};

/// Registry precondition violations. These indicate caller bugs, not
/// recoverable runtime conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A handle is already registered (or a detached pid tracked) for the slot.
    #[error("slot {0} is already occupied")]
    SlotOccupied(&'static str),
}

/// How a slot's process is currently held.
#[derive(Debug)]
pub enum SlotOwnership {
    /// We spawned it this session and hold its exit monitor.
    Owned {
        pid: u32,
        /// Task waiting on the child's exit. Absent for the brief window
        /// between registration and monitor attachment.
        monitor: Option<JoinHandle<()>>,
    },
    /// Released to the background; only the pid is tracked (bundler only).
    Detached { pid: u32 },
}

impl SlotOwnership {
    /// The pid behind this ownership, whichever variant it is.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        match self {
            Self::Owned { pid, .. } | Self::Detached { pid } => *pid,
        }
    }
}

/// Table of live process handles and last known statuses.
///
/// All mutation must happen under one mutex (the supervisor wraps the
/// registry accordingly), since exit monitors fire from the tokio pool.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    slots: HashMap<ProcessSlot, SlotOwnership>,
    statuses: HashMap<ProcessSlot, ProcessStatus>,
}

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned, owned process for a slot.
    ///
    /// Fails if the slot already holds any ownership - callers must check
    /// their preconditions first.
    pub fn register(&mut self, slot: ProcessSlot, pid: u32) -> Result<(), RegistryError> {
        if self.slots.contains_key(&slot) {
            return Err(RegistryError::SlotOccupied(slot.name()));
        }
        self.slots
            .insert(slot, SlotOwnership::Owned { pid, monitor: None });
        Ok(())
    }

    /// Attach the exit-monitor task to an owned slot.
    pub fn attach_monitor(&mut self, slot: ProcessSlot, handle: JoinHandle<()>) {
        if let Some(SlotOwnership::Owned { monitor, .. }) = self.slots.get_mut(&slot) {
            *monitor = Some(handle);
        }
    }

    /// Track a pid for the bundler slot without owning a handle.
    pub fn adopt_detached(&mut self, slot: ProcessSlot, pid: u32) -> Result<(), RegistryError> {
        if self.slots.contains_key(&slot) {
            return Err(RegistryError::SlotOccupied(slot.name()));
        }
        self.slots.insert(slot, SlotOwnership::Detached { pid });
        Ok(())
    }

    /// Pid of the owned handle for a slot, if any.
    #[must_use]
    pub fn owned_pid(&self, slot: ProcessSlot) -> Option<u32> {
        match self.slots.get(&slot) {
            Some(SlotOwnership::Owned { pid, .. }) => Some(*pid),
            _ => None,
        }
    }

    /// Detached pid tracked for a slot, if any.
    #[must_use]
    pub fn detached_pid(&self, slot: ProcessSlot) -> Option<u32> {
        match self.slots.get(&slot) {
            Some(SlotOwnership::Detached { pid }) => Some(*pid),
            _ => None,
        }
    }

    /// Pid behind the slot, owned or detached.
    #[must_use]
    pub fn any_pid(&self, slot: ProcessSlot) -> Option<u32> {
        self.slots.get(&slot).map(SlotOwnership::pid)
    }

    /// Convert an owned slot to detached in place, aborting its exit
    /// monitor so the exit of the released process is no longer observed.
    ///
    /// Returns the pid, or `None` when the slot held no owned handle.
    pub fn detach(&mut self, slot: ProcessSlot) -> Option<u32> {
        match self.slots.remove(&slot)? {
            SlotOwnership::Owned { pid, monitor } => {
                if let Some(handle) = monitor {
                    handle.abort();
                }
                self.slots.insert(slot, SlotOwnership::Detached { pid });
                Some(pid)
            }
            detached @ SlotOwnership::Detached { .. } => {
                // Already detached; keep the entry, report nothing to detach.
                self.slots.insert(slot, detached);
                None
            }
        }
    }

    /// Remove whatever the slot holds, aborting the exit monitor if one is
    /// attached. Idempotent: removing an empty slot returns `None`.
    pub fn unregister(&mut self, slot: ProcessSlot) -> Option<u32> {
        let entry = self.slots.remove(&slot)?;
        let pid = entry.pid();
        if let SlotOwnership::Owned {
            monitor: Some(handle),
            ..
        } = entry
        {
            handle.abort();
        }
        Some(pid)
    }

    /// Remove an owned entry after its process exited, without aborting the
    /// (already finished) monitor. Called by the monitor itself; returns
    /// `false` when the entry is gone or no longer owned, meaning a
    /// stop/detach won the race and no exit reporting should happen.
    pub fn reap(&mut self, slot: ProcessSlot, pid: u32) -> bool {
        match self.slots.get(&slot) {
            Some(SlotOwnership::Owned { pid: owned, .. }) if *owned == pid => {
                self.slots.remove(&slot);
                true
            }
            _ => false,
        }
    }

    /// Record the last reported status for a slot.
    pub fn set_status(&mut self, slot: ProcessSlot, status: ProcessStatus) {
        self.statuses.insert(slot, status);
    }

    /// Last reported status for a slot; `Idle` before any report.
    #[must_use]
    pub fn status_of(&self, slot: ProcessSlot) -> ProcessStatus {
        self.statuses
            .get(&slot)
            .copied()
            .unwrap_or(ProcessStatus::Idle)
    }
}
