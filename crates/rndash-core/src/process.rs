//! Process slot and status definitions.
//!
//! The supervisor manages a small fixed set of process identities rather
//! than an arbitrary job table; the slots are enumerated here so the
//! registry can enforce "at most one live handle per slot" structurally.

use serde::{Deserialize, Serialize};

/// One of the fixed process identities the supervisor manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessSlot {
    /// The persistent Metro bundler (`react-native start`).
    Bundler,
    /// The one-shot Android build (`react-native run-android`).
    Android,
    /// The one-shot iOS build (`react-native run-ios`).
    Ios,
    /// The auxiliary device log stream. Has no externally visible status.
    DeviceLogs,
}

impl ProcessSlot {
    /// Human-readable slot name, used in narrative log messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bundler => "metro",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::DeviceLogs => "device-logs",
        }
    }
}

/// Target platform for a one-shot build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// The build slot for this platform.
    #[must_use]
    pub const fn slot(self) -> ProcessSlot {
        match self {
            Self::Android => ProcessSlot::Android,
            Self::Ios => ProcessSlot::Ios,
        }
    }
}

/// Externally visible status of a supervised slot.
///
/// The bundler walks `Idle -> Building -> Running -> {Idle, Error}` with the
/// `Detached` branch for processes released to the background; build slots
/// only ever report `Idle`, `Building` or `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    #[default]
    Idle,
    Building,
    Running,
    Error,
    Detached,
}

impl ProcessStatus {
    /// Whether this status means the slot has (or is believed to have) a
    /// live OS process behind it.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Building | Self::Running | Self::Detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_maps_to_build_slot() {
        assert_eq!(Platform::Android.slot(), ProcessSlot::Android);
        assert_eq!(Platform::Ios.slot(), ProcessSlot::Ios);
    }

    #[test]
    fn live_statuses() {
        assert!(ProcessStatus::Running.is_live());
        assert!(ProcessStatus::Detached.is_live());
        assert!(!ProcessStatus::Idle.is_live());
        assert!(!ProcessStatus::Error.is_live());
    }
}
