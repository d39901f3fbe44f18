//! Detached bundler pid persistence.
//!
//! A detached bundler leaves a pid file at
//! `<data-root>/bundler-<fingerprint>.pid` so a later rndash session can
//! reattach to it. The file holds the pid as decimal text, nothing else.
//!
//! # Known hazard
//!
//! The pid file is shared filesystem state: two rndash instances running
//! against the same project root will race on it. No cross-instance locking
//! is provided; the last writer wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rndash_core::paths::pid_file_path;

fn resolve_path(project_root: &Path) -> io::Result<PathBuf> {
    pid_file_path(project_root).map_err(io::Error::other)
}

/// Write the detached pid atomically using temp file + rename.
pub fn write_pid(project_root: &Path, pid: u32) -> io::Result<PathBuf> {
    let final_path = resolve_path(project_root)?;
    let temp_path = final_path.with_extension("pid.tmp");

    fs::write(&temp_path, pid.to_string())?;
    fs::rename(&temp_path, &final_path)?;

    Ok(final_path)
}

/// Read the persisted pid.
///
/// Returns `Ok(None)` when the file is absent, empty or unparsable - a
/// stale or garbled file is the same as no file.
pub fn read_pid(project_root: &Path) -> io::Result<Option<u32>> {
    let path = resolve_path(project_root)?;
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(content.trim().parse::<u32>().ok())
}

/// Delete the pid file (idempotent - no error if missing).
pub fn clear_pid(project_root: &Path) -> io::Result<()> {
    let path = resolve_path(project_root)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Check if a pid names a live process.
///
/// Uses `kill` with the null signal, which checks existence without sending
/// anything. A process we lack permission to signal still exists.
#[cfg(unix)]
#[must_use]
pub fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid;

    match signal::kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn pid_alive(_pid: u32) -> bool {
    false
}
