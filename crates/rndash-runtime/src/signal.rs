//! Fire-and-forget process tree termination.
//!
//! The supervisor requests termination and never waits for it: a subsequent
//! `start` is allowed to race with a straggling process. Children we spawn
//! get their own process group, so signalling the group covers the whole
//! tree (the npx wrapper plus the node process it execs).

use tracing::debug;

/// Request termination of the process tree rooted at `pid` with SIGTERM.
///
/// Tries the process group first; processes that are not group leaders
/// (scanned orphans can be anything) get a plain SIGTERM instead. Errors
/// are logged and swallowed - by contract this is a request, not a
/// confirmation.
#[cfg(unix)]
pub fn request_tree_termination(pid: u32) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let target = Pid::from_raw(pid as i32);
    match signal::killpg(target, Signal::SIGTERM) {
        Ok(()) => {
            debug!(pid = %pid, "sent SIGTERM to process group");
        }
        Err(group_err) => match signal::kill(target, Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid = %pid, "sent SIGTERM to lone process");
            }
            Err(proc_err) => {
                debug!(
                    pid = %pid,
                    group_error = %group_err,
                    process_error = %proc_err,
                    "termination request failed, target likely already gone"
                );
            }
        },
    }
}

#[cfg(not(unix))]
pub fn request_tree_termination(pid: u32) {
    debug!(pid = %pid, "tree termination not supported on this platform");
}
