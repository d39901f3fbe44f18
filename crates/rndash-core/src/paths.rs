//! Path resolution for the per-user rndash data directory.
//!
//! Everything rndash persists (detached bundler pid files, preferences, the
//! tracing log) lives under one data root:
//!
//! 1. `RNDASH_DATA_DIR` environment variable (highest priority, used by
//!    tests to isolate the filesystem)
//! 2. `~/.rndash`
//!
//! The directory is created on demand, idempotently.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the data root location.
pub const DATA_DIR_ENV: &str = "RNDASH_DATA_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the user's home directory.
    #[error("Cannot determine home directory")]
    NoHomeDir,

    /// Failed to create the data directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Root directory for rndash user data, created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = if let Ok(path) = env::var(DATA_DIR_ENV) {
        PathBuf::from(path)
    } else {
        dirs::home_dir().ok_or(PathError::NoHomeDir)?.join(".rndash")
    };

    if !root.is_dir() {
        debug!(path = %root.display(), "creating data root");
    }
    fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
        path: root.clone(),
        reason: e.to_string(),
    })?;

    Ok(root)
}

/// Short fingerprint of a project root path.
///
/// First 8 hex characters of the SHA-256 of the path string. Deterministic,
/// so every rndash invocation against the same project root agrees on the
/// pid file location.
#[must_use]
pub fn root_fingerprint(project_root: &Path) -> String {
    let digest = Sha256::digest(project_root.to_string_lossy().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..8].to_string()
}

/// Location of the detached bundler pid file for a project root.
///
/// `<data-root>/bundler-<fingerprint>.pid`, decimal pid as content.
pub fn pid_file_path(project_root: &Path) -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(format!("bundler-{}.pid", root_fingerprint(project_root))))
}

/// Location of the preferences file.
pub fn prefs_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("prefs.json"))
}

/// Location of the tracing log file written by the TUI binary.
pub fn log_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("rndash.log"))
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    //! Environment-variable scaffolding for tests that point
    //! `RNDASH_DATA_DIR` (or the locale variables) at a temp location.
    //!
    //! Process environment is global, so every test touching it takes
    //! [`ENV_LOCK`] first and holds it for the test body; the guards then
    //! put the variable back whatever the test did.

    use std::env;
    use std::sync::Mutex;

    /// Serializes tests that read or mutate process environment variables.
    pub static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Scoped environment override. On drop the variable returns to its
    /// pre-guard state, set or unset.
    pub struct EnvVarGuard {
        key: String,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn capture(key: &str) -> Self {
            Self {
                key: key.to_string(),
                previous: env::var(key).ok(),
            }
        }

        /// Override `key` with `value` for the guard's lifetime.
        #[allow(unsafe_code)]
        pub fn set(key: &str, value: &str) -> Self {
            let guard = Self::capture(key);
            unsafe {
                env::set_var(key, value);
            }
            guard
        }

        /// Unset `key` for the guard's lifetime.
        #[allow(unsafe_code)]
        pub fn remove(key: &str) -> Self {
            let guard = Self::capture(key);
            unsafe {
                env::remove_var(key);
            }
            guard
        }
    }

    impl Drop for EnvVarGuard {
        #[allow(unsafe_code)]
        fn drop(&mut self) {
            if let Some(ref value) = self.previous {
                unsafe {
                    env::set_var(&self.key, value);
                }
            } else {
                unsafe {
                    env::remove_var(&self.key);
                }
            }
        }
    }
}
