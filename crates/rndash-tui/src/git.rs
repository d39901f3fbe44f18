//! Cosmetic git summary for the header.
//!
//! Branch name plus `git diff --shortstat` counts against HEAD, refreshed on
//! an interval by a background task. Everything here is best-effort: a
//! missing git binary, a non-repo directory or any parse miss just yields an
//! empty summary.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use crate::events::UiEvent;

const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

static FILES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) file").unwrap());
static ADDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) insertion").unwrap());
static DELS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+) deletion").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitSummary {
    pub branch: Option<String>,
    pub changed_files: u32,
    pub additions: u32,
    pub deletions: u32,
}

fn capture_count(re: &Regex, haystack: &str) -> u32 {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn parse_shortstat(shortstat: &str) -> (u32, u32, u32) {
    (
        capture_count(&FILES_RE, shortstat),
        capture_count(&ADDS_RE, shortstat),
        capture_count(&DELS_RE, shortstat),
    )
}

async fn git_stdout(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Collect the current git summary for a directory.
pub async fn collect(cwd: &Path) -> GitSummary {
    let branch = git_stdout(cwd, &["rev-parse", "--abbrev-ref", "HEAD"]).await;
    let (changed_files, additions, deletions) = match git_stdout(cwd, &["diff", "--shortstat", "HEAD"]).await
    {
        Some(shortstat) => parse_shortstat(&shortstat),
        None => (0, 0, 0),
    };

    GitSummary {
        branch,
        changed_files,
        additions,
        deletions,
    }
}

/// Spawn the polling task feeding the UI event channel. Runs until the
/// channel closes.
pub fn spawn_poller(cwd: PathBuf, tx: UnboundedSender<UiEvent>) {
    tokio::spawn(async move {
        loop {
            let summary = collect(&cwd).await;
            if tx.send(UiEvent::Git(summary)).is_err() {
                return;
            }
            tokio::time::sleep(REFRESH_INTERVAL).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortstat_parses_all_three_counts() {
        let line = " 3 files changed, 41 insertions(+), 7 deletions(-)";
        assert_eq!(parse_shortstat(line), (3, 41, 7));
    }

    #[test]
    fn shortstat_without_deletions_defaults_to_zero() {
        let line = " 1 file changed, 2 insertions(+)";
        assert_eq!(parse_shortstat(line), (1, 2, 0));
        assert_eq!(parse_shortstat(""), (0, 0, 0));
    }

    #[tokio::test]
    async fn non_repo_directory_yields_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = collect(dir.path()).await;
        assert_eq!(summary, GitSummary::default());
    }
}
