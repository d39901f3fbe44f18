//! Supervisor configuration.
//!
//! Every command line the supervisor spawns and every cache path the
//! recovery workflow deletes comes from here, not from hard-coded strings in
//! the state machine. Tests substitute plain shell commands; production code
//! uses [`SupervisorConfig::default`], which encodes the React Native CLI
//! conventions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::process::Platform;

/// A spawnable command: program plus arguments, no shell involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(ToString::to_string).collect(),
        }
    }

    /// Parse a whitespace-separated command string ("yarn install").
    ///
    /// Returns `None` for an empty string.
    #[must_use]
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(ToString::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Static configuration for the lifecycle supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Command that starts the bundler.
    pub bundler: CommandSpec,
    /// Extra flag appended to the bundler command for a cache-reset start.
    pub bundler_cache_reset_flag: String,
    /// Commands for the one-shot platform builds.
    pub android_build: CommandSpec,
    pub ios_build: CommandSpec,
    /// Commands for the auxiliary device log streams.
    pub android_device_logs: CommandSpec,
    pub ios_device_logs: CommandSpec,
    /// Substrings that must all appear in a process command line for it to
    /// count as a bundler orphan.
    pub orphan_signature: Vec<String>,
    /// Dependency cache directory under the app root, removed by the
    /// recovery workflow.
    pub dependency_dir: String,
    /// Derived native build-cache directories under the app root, removed by
    /// the recovery workflow.
    pub native_build_dirs: Vec<PathBuf>,
    /// Third-party native module whose stale build cache is also removed
    /// when present, looked up under `<project-root>/<dependency-dir>/`.
    pub stale_native_module: Option<String>,
    /// Overrides the install command derived from the detected package
    /// manager, e.g. `yarn install --frozen-lockfile`.
    pub install_override: Option<CommandSpec>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            bundler: CommandSpec::new("npx", &["react-native", "start"]),
            bundler_cache_reset_flag: "--reset-cache".to_string(),
            android_build: CommandSpec::new("npx", &["react-native", "run-android"]),
            ios_build: CommandSpec::new("npx", &["react-native", "run-ios"]),
            android_device_logs: CommandSpec::new("npx", &["react-native", "log-android"]),
            ios_device_logs: CommandSpec::new("npx", &["react-native", "log-ios"]),
            orphan_signature: vec!["react-native".to_string(), "start".to_string()],
            dependency_dir: "node_modules".to_string(),
            native_build_dirs: vec![
                PathBuf::from("android/build"),
                PathBuf::from("android/app/build"),
                PathBuf::from("android/.gradle"),
            ],
            stale_native_module: Some("react-native-image-picker".to_string()),
            install_override: None,
        }
    }
}

impl SupervisorConfig {
    /// The build command for a platform.
    #[must_use]
    pub const fn build_command(&self, platform: Platform) -> &CommandSpec {
        match platform {
            Platform::Android => &self.android_build,
            Platform::Ios => &self.ios_build,
        }
    }

    /// The device log stream command for a platform.
    #[must_use]
    pub const fn device_log_command(&self, platform: Platform) -> &CommandSpec {
        match platform {
            Platform::Android => &self.android_device_logs,
            Platform::Ios => &self.ios_device_logs,
        }
    }

    /// The bundler command, with the cache-reset flag appended when asked.
    #[must_use]
    pub fn bundler_command(&self, reset_cache: bool) -> CommandSpec {
        let mut command = self.bundler.clone();
        if reset_cache {
            command.args.push(self.bundler_cache_reset_flag.clone());
        }
        command
    }
}
