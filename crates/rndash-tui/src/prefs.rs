//! Persisted dashboard preferences.
//!
//! One small JSON file under the data root. Loading is lenient: a missing,
//! unreadable or malformed file yields defaults. Saving is best-effort; a
//! failure is traced and otherwise ignored, preferences are never worth
//! interrupting the user for.

use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rndash_core::paths;

/// How the log panels are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLayout {
    #[default]
    Grid,
    Rows,
    Merged,
}

impl LogLayout {
    /// Next layout in the `V` cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Grid => Self::Rows,
            Self::Rows => Self::Merged,
            Self::Merged => Self::Grid,
        }
    }

    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Grid => "GRID",
            Self::Rows => "ROWS",
            Self::Merged => "ALL",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Prefs {
    #[serde(rename = "logLayout", default)]
    pub log_layout: LogLayout,
}

/// Load preferences, defaulting on any failure.
#[must_use]
pub fn load() -> Prefs {
    let Ok(path) = paths::prefs_path() else {
        return Prefs::default();
    };
    match fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        Err(_) => Prefs::default(),
    }
}

/// Persist preferences; failures are traced and swallowed.
pub fn save(prefs: &Prefs) {
    let Ok(path) = paths::prefs_path() else { return };
    match serde_json::to_string_pretty(prefs) {
        Ok(raw) => {
            if let Err(e) = fs::write(&path, raw) {
                debug!(error = %e, path = %path.display(), "could not save prefs");
            }
        }
        Err(e) => debug!(error = %e, "could not serialize prefs"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rndash_core::paths::DATA_DIR_ENV;
    use rndash_core::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn layout_cycle_visits_every_layout() {
        let start = LogLayout::Grid;
        assert_eq!(start.next(), LogLayout::Rows);
        assert_eq!(start.next().next(), LogLayout::Merged);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn prefs_round_trip_through_the_data_root() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let _guard = EnvVarGuard::set(DATA_DIR_ENV, dir.path().to_string_lossy().as_ref());

        save(&Prefs {
            log_layout: LogLayout::Merged,
        });
        assert_eq!(load().log_layout, LogLayout::Merged);
    }

    #[test]
    fn malformed_prefs_fall_back_to_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let _guard = EnvVarGuard::set(DATA_DIR_ENV, dir.path().to_string_lossy().as_ref());

        let path = rndash_core::paths::prefs_path().unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load().log_layout, LogLayout::Grid);
    }
}
