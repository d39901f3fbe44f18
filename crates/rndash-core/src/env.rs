//! React Native project environment detection.
//!
//! Resolves which package manager a project uses, where the workspace root
//! is (monorepos keep their lockfile above the app), and the install command
//! the supervisor should run. Detection is filesystem-only and best-effort:
//! an undetectable environment falls back to npm with the working directory
//! as both roots.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Package manager the project was detected to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// The install command for this package manager, as one shell-less
    /// program-plus-args string.
    #[must_use]
    pub const fn install_command(self) -> &'static str {
        match self {
            Self::Yarn => "yarn install",
            Self::Pnpm => "pnpm install",
            Self::Npm => "npm install",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Npm => "npm",
        }
    }
}

/// Detected project environment handed to the supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RnEnvironment {
    pub package_manager: PackageManager,
    pub is_monorepo: bool,
    /// Directory holding the lockfile; install runs here.
    pub project_root: PathBuf,
    /// Directory the dashboard was launched from; builds and the bundler run here.
    pub app_root: PathBuf,
    /// Output of `node --version`, when a node binary is reachable.
    pub node_version: Option<String>,
}

/// Walk up from `start` looking for a file named `name`.
fn find_up(start: &Path, name: &str) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn detect_monorepo(project_root: &Path) -> bool {
    let pkg_path = project_root.join("package.json");
    if let Ok(raw) = fs::read_to_string(&pkg_path)
        && let Ok(pkg) = serde_json::from_str::<Value>(&raw)
        && pkg.get("workspaces").is_some()
    {
        return true;
    }

    project_root.join("lerna.json").is_file() || project_root.join("pnpm-workspace.yaml").is_file()
}

fn node_version() -> Option<String> {
    let output = Command::new("node").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

/// Detect the React Native environment for a working directory.
///
/// Lockfile priority matches the ecosystem convention: yarn, then pnpm,
/// then npm. The lockfile's directory becomes the project root.
#[must_use]
pub fn detect_environment(cwd: &Path) -> RnEnvironment {
    let app_root = cwd.to_path_buf();

    let yarn_lock = find_up(cwd, "yarn.lock");
    let pnpm_lock = find_up(cwd, "pnpm-lock.yaml");
    let npm_lock = find_up(cwd, "package-lock.json");

    let package_manager = if yarn_lock.is_some() {
        PackageManager::Yarn
    } else if pnpm_lock.is_some() {
        PackageManager::Pnpm
    } else {
        PackageManager::Npm
    };

    let project_root = yarn_lock
        .or(pnpm_lock)
        .or(npm_lock)
        .and_then(|lock| lock.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| app_root.clone());

    let is_monorepo = detect_monorepo(&project_root);
    debug!(
        package_manager = package_manager.name(),
        monorepo = is_monorepo,
        project_root = %project_root.display(),
        "detected project environment"
    );

    RnEnvironment {
        package_manager,
        is_monorepo,
        project_root,
        app_root,
        node_version: node_version(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_npm_without_lockfiles() {
        let temp = tempdir().unwrap();
        let env = detect_environment(temp.path());
        assert_eq!(env.package_manager, PackageManager::Npm);
        assert_eq!(env.project_root, temp.path());
        assert_eq!(env.app_root, temp.path());
        assert!(!env.is_monorepo);
    }

    #[test]
    fn yarn_lock_wins_over_npm_lock() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();

        let env = detect_environment(temp.path());
        assert_eq!(env.package_manager, PackageManager::Yarn);
    }

    #[test]
    fn monorepo_lockfile_above_app_sets_project_root() {
        let temp = tempdir().unwrap();
        let app = temp.path().join("packages").join("mobile");
        fs::create_dir_all(&app).unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        )
        .unwrap();

        let env = detect_environment(&app);
        assert_eq!(env.project_root, temp.path());
        assert_eq!(env.app_root, app);
        assert!(env.is_monorepo);
    }

    #[test]
    fn lerna_marker_counts_as_monorepo() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("package-lock.json"), "{}").unwrap();
        fs::write(temp.path().join("lerna.json"), "{}").unwrap();

        let env = detect_environment(temp.path());
        assert!(env.is_monorepo);
    }

    #[test]
    fn install_commands() {
        assert_eq!(PackageManager::Yarn.install_command(), "yarn install");
        assert_eq!(PackageManager::Pnpm.install_command(), "pnpm install");
        assert_eq!(PackageManager::Npm.install_command(), "npm install");
    }
}
