//! System-wide scan for bundler processes nobody owns.
//!
//! The heuristic is a command-line substring match, kept behind a trait so
//! the supervisor's state machine never learns how a given OS lists its
//! processes, and so tests can inject fixed candidate sets.

use sysinfo::System;
use tracing::debug;

/// Source of bundler-orphan candidates.
pub trait OrphanScanner: Send + Sync {
    /// Pids of processes that look like a bundler, own process excluded.
    ///
    /// Candidates come back in whatever order the OS process listing
    /// yields them - callers that pick "the first" accept that
    /// nondeterminism. Any failure to enumerate processes yields an empty
    /// vec, never an error.
    fn candidates(&self) -> Vec<u32>;
}

/// Production scanner backed by `sysinfo`.
pub struct SystemProcessScanner {
    /// Substrings that must all appear in a candidate's command line.
    signature: Vec<String>,
}

impl SystemProcessScanner {
    #[must_use]
    pub fn new(signature: Vec<String>) -> Self {
        Self { signature }
    }
}

impl OrphanScanner for SystemProcessScanner {
    fn candidates(&self) -> Vec<u32> {
        let own_pid = std::process::id();
        let sys = System::new_all();

        let pids: Vec<u32> = sys
            .processes()
            .iter()
            .filter_map(|(pid, process)| {
                let pid = pid.as_u32();
                if pid == own_pid {
                    return None;
                }
                let cmdline = process
                    .cmd()
                    .iter()
                    .map(|part| part.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.signature
                    .iter()
                    .all(|needle| cmdline.contains(needle.as_str()))
                    .then_some(pid)
            })
            .collect();

        debug!(count = pids.len(), "orphan scan complete");
        pids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_never_reports_own_process() {
        // An empty signature matches every command line, including ours if
        // the self-exclusion were missing.
        let scanner = SystemProcessScanner::new(Vec::new());
        let own_pid = std::process::id();
        assert!(!scanner.candidates().contains(&own_pid));
    }

    #[test]
    fn unmatchable_signature_yields_nothing() {
        let scanner =
            SystemProcessScanner::new(vec!["rndash-definitely-not-a-real-command".to_string()]);
        assert!(scanner.candidates().is_empty());
    }
}
