//! Lifecycle supervisor for the fixed set of development processes.
//!
//! Owns the registry, the pid persistence store and the orphan scanner, and
//! exposes the command surface the dashboard drives: start/stop/detach/
//! reattach for the bundler, one-shot platform builds, dependency install,
//! orphan cleanup and the full-reset recovery workflow.
//!
//! Commands are issued one at a time by the UI event loop; child output and
//! exits arrive on tokio tasks, so all registry access goes through one
//! mutex. Termination is always a request (SIGTERM to the process group),
//! never awaited - a fresh `start` may race with a straggling process and
//! that is accepted.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use rndash_core::config::{CommandSpec, SupervisorConfig};
use rndash_core::env::RnEnvironment;
use rndash_core::events::SupervisorEvents;
use rndash_core::logs::{LogLevel, LogRecord, LogSource};
use rndash_core::process::{Platform, ProcessSlot, ProcessStatus};

use crate::orphan::{OrphanScanner, SystemProcessScanner};
use crate::pidfile;
use crate::registry::ProcessRegistry;
use crate::relay;
use crate::signal::request_tree_termination;

/// Process lifecycle supervisor.
///
/// Construct once at startup and share behind an `Arc`; every command
/// method takes `&self`.
pub struct Supervisor {
    config: SupervisorConfig,
    env: RnEnvironment,
    registry: Arc<Mutex<ProcessRegistry>>,
    events: Arc<dyn SupervisorEvents>,
    scanner: Arc<dyn OrphanScanner>,
}

impl Supervisor {
    /// Create a supervisor with the production orphan scanner.
    #[must_use]
    pub fn new(
        config: SupervisorConfig,
        env: RnEnvironment,
        events: Arc<dyn SupervisorEvents>,
    ) -> Self {
        let scanner = Arc::new(SystemProcessScanner::new(config.orphan_signature.clone()));
        Self::with_scanner(config, env, events, scanner)
    }

    /// Create a supervisor with an injected orphan scanner (tests).
    #[must_use]
    pub fn with_scanner(
        config: SupervisorConfig,
        env: RnEnvironment,
        events: Arc<dyn SupervisorEvents>,
        scanner: Arc<dyn OrphanScanner>,
    ) -> Self {
        Self {
            config,
            env,
            registry: Arc::new(Mutex::new(ProcessRegistry::new())),
            events,
            scanner,
        }
    }

    /// Last reported status of a slot.
    #[must_use]
    pub fn status_of(&self, slot: ProcessSlot) -> ProcessStatus {
        self.registry.lock().unwrap().status_of(slot)
    }

    /// Pid behind the bundler slot, owned or detached.
    #[must_use]
    pub fn bundler_pid(&self) -> Option<u32> {
        self.registry
            .lock()
            .unwrap()
            .any_pid(ProcessSlot::Bundler)
    }

    /// Whether the registry holds an owned handle for a slot.
    #[must_use]
    pub fn owns(&self, slot: ProcessSlot) -> bool {
        self.registry.lock().unwrap().owned_pid(slot).is_some()
    }

    // ---- bundler ---------------------------------------------------------

    /// Start the bundler.
    ///
    /// No-op when an owned handle exists; no-op with an informational log
    /// when a detached pid is confirmed alive. A detached pid that turns
    /// out dead is discarded and the start proceeds.
    pub fn start_bundler(&self, reset_cache: bool) {
        {
            let mut registry = self.registry.lock().unwrap();
            if registry.owned_pid(ProcessSlot::Bundler).is_some() {
                return;
            }
            if let Some(pid) = registry.detached_pid(ProcessSlot::Bundler) {
                if pidfile::pid_alive(pid) {
                    drop(registry);
                    self.log_system(
                        LogLevel::Info,
                        format!("metro is already running at pid {pid}"),
                    );
                    return;
                }
                registry.unregister(ProcessSlot::Bundler);
            }
        }

        self.report_status(ProcessSlot::Bundler, ProcessStatus::Building, None);

        let command = self.config.bundler_command(reset_cache);
        match self.spawn_child(&command, &self.env.app_root) {
            Err(e) => self.report_spawn_failure(ProcessSlot::Bundler, "metro", &e),
            Ok(mut child) => {
                let Some(pid) = child.id() else {
                    self.report_spawn_failure(
                        ProcessSlot::Bundler,
                        "metro",
                        &io::Error::other("process exited before startup completed"),
                    );
                    return;
                };
                if let Err(e) = self.registry.lock().unwrap().register(ProcessSlot::Bundler, pid) {
                    warn!(error = %e, "bundler registration raced, killing duplicate");
                    request_tree_termination(pid);
                    return;
                }
                self.log_system(
                    LogLevel::Info,
                    if reset_cache {
                        "starting metro with a fresh cache..."
                    } else {
                        "starting metro..."
                    },
                );
                relay::attach(&mut child, LogSource::Bundler, &self.events);
                self.report_status(ProcessSlot::Bundler, ProcessStatus::Running, Some(pid));
                self.spawn_exit_monitor(ProcessSlot::Bundler, child, pid);
                info!(pid = %pid, reset_cache, "metro started");
            }
        }
    }

    /// Stop the bundler, owned or detached. Clears the persisted pid file.
    pub fn stop_bundler(&self) {
        let pid = self.registry.lock().unwrap().any_pid(ProcessSlot::Bundler);
        let Some(pid) = pid else { return };

        self.log_system(LogLevel::Info, "stopping metro...");
        self.registry.lock().unwrap().unregister(ProcessSlot::Bundler);
        request_tree_termination(pid);
        self.clear_pid_file();
        self.report_status(ProcessSlot::Bundler, ProcessStatus::Idle, None);
    }

    /// Stop, then start again. The restart may race with the dying process;
    /// accepted by design.
    pub fn restart_bundler(&self, reset_cache: bool) {
        self.stop_bundler();
        self.start_bundler(reset_cache);
    }

    /// Release the owned bundler to the background, persisting its pid for
    /// a later [`Self::reattach_bundler`]. No-op without an owned handle.
    pub fn detach_bundler(&self) {
        let Some(pid) = self.registry.lock().unwrap().detach(ProcessSlot::Bundler) else {
            return;
        };

        match pidfile::write_pid(&self.env.app_root, pid) {
            Ok(path) => debug!(path = %path.display(), "persisted detached metro pid"),
            Err(e) => self.log_system(
                LogLevel::Warn,
                format!("could not persist detached metro pid: {e}"),
            ),
        }
        self.report_status(ProcessSlot::Bundler, ProcessStatus::Detached, Some(pid));
        self.log_system(
            LogLevel::Info,
            format!("metro detached, still running at pid {pid}"),
        );
    }

    /// Recover a bundler from a previous session.
    ///
    /// Consults the pid file first; a confirmed-alive pid is adopted as the
    /// detached bundler. A stale file is silently repaired (deleted, logged
    /// informationally). With no usable pid file the orphan scanner is the
    /// fallback: the first candidate - the scan order is OS-defined - is
    /// adopted best-effort with a warning, since ownership is unconfirmed.
    ///
    /// Returns whether a bundler was adopted.
    pub fn reattach_bundler(&self) -> bool {
        match pidfile::read_pid(&self.env.app_root) {
            Ok(Some(pid)) if pidfile::pid_alive(pid) => {
                if self
                    .registry
                    .lock()
                    .unwrap()
                    .adopt_detached(ProcessSlot::Bundler, pid)
                    .is_ok()
                {
                    self.log_system(
                        LogLevel::Info,
                        format!("metro is running in the background at pid {pid}"),
                    );
                    self.report_status(ProcessSlot::Bundler, ProcessStatus::Running, Some(pid));
                    return true;
                }
                return false;
            }
            Ok(Some(_)) => {
                self.clear_pid_file();
                self.log_system(LogLevel::Info, "removed stale metro pid file");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read metro pid file"),
        }

        let candidates = self.scanner.candidates();
        if let Some(&pid) = candidates.first() {
            if self
                .registry
                .lock()
                .unwrap()
                .adopt_detached(ProcessSlot::Bundler, pid)
                .is_ok()
            {
                self.log_system(
                    LogLevel::Warn,
                    format!("adopted orphan metro process at pid {pid}"),
                );
                self.report_status(ProcessSlot::Bundler, ProcessStatus::Running, Some(pid));
                return true;
            }
        }
        false
    }

    /// Terminate every bundler-like process this instance does not own.
    ///
    /// A merely-detached pid is itself a kill target; only pids with an
    /// owned live handle are excluded. Returns the number of processes
    /// signalled.
    ///
    /// The pid file and bundler slot are reset to idle only when no owned
    /// bundler was spared by the sweep: an owned slot's registry entry and
    /// reported status describe a process the sweep did not touch, and
    /// resetting them would lie about a bundler that is still running.
    pub fn kill_orphans(&self) -> usize {
        let owned = self.registry.lock().unwrap().owned_pid(ProcessSlot::Bundler);
        let targets: Vec<u32> = self
            .scanner
            .candidates()
            .into_iter()
            .filter(|pid| Some(*pid) != owned)
            .collect();

        if targets.is_empty() {
            self.log_system(LogLevel::Info, "no orphan metro processes found");
            return 0;
        }

        for pid in &targets {
            self.log_system(
                LogLevel::Warn,
                format!("killing orphan metro process at pid {pid}"),
            );
            request_tree_termination(*pid);
        }

        // An owned bundler was spared, so its slot state stands. Otherwise a
        // detached entry may just have been killed out from under us.
        if owned.is_none() {
            self.clear_pid_file();
            let mut registry = self.registry.lock().unwrap();
            if registry.detached_pid(ProcessSlot::Bundler).is_some() {
                registry.unregister(ProcessSlot::Bundler);
            }
            drop(registry);
            self.report_status(ProcessSlot::Bundler, ProcessStatus::Idle, None);
        }
        self.log_system(
            LogLevel::Info,
            format!("killed {} orphan metro process(es)", targets.len()),
        );
        targets.len()
    }

    // ---- platform builds -------------------------------------------------

    /// Run a one-shot platform build. No-op while a build for that platform
    /// is in flight. On spawn confirmation the device log stream for the
    /// platform is started best-effort.
    pub fn run_build(&self, platform: Platform) {
        let slot = platform.slot();
        if self.registry.lock().unwrap().owned_pid(slot).is_some() {
            return;
        }

        let source = LogSource::from(platform);
        self.log_system(LogLevel::Info, format!("building {}...", slot.name()));

        match self.spawn_child(self.config.build_command(platform), &self.env.app_root) {
            Err(e) => self.report_spawn_failure(slot, slot.name(), &e),
            Ok(mut child) => {
                let Some(pid) = child.id() else {
                    self.report_spawn_failure(
                        slot,
                        slot.name(),
                        &io::Error::other("process exited before startup completed"),
                    );
                    return;
                };
                if let Err(e) = self.registry.lock().unwrap().register(slot, pid) {
                    warn!(error = %e, "build registration raced, killing duplicate");
                    request_tree_termination(pid);
                    return;
                }
                relay::attach(&mut child, source, &self.events);
                // Builds stay `Building` until exit; they never report Running.
                self.report_status(slot, ProcessStatus::Building, Some(pid));
                self.start_device_logs(platform);
                self.spawn_exit_monitor(slot, child, pid);
            }
        }
    }

    // ---- device log stream -----------------------------------------------

    /// Start the auxiliary device log stream for a platform, if not already
    /// running. Best-effort: failures are traced, never reported.
    fn start_device_logs(&self, platform: Platform) {
        if self
            .registry
            .lock()
            .unwrap()
            .owned_pid(ProcessSlot::DeviceLogs)
            .is_some()
        {
            return;
        }

        match self.spawn_child(self.config.device_log_command(platform), &self.env.app_root) {
            Err(e) => debug!(error = %e, "device log stream failed to start"),
            Ok(mut child) => {
                let Some(pid) = child.id() else { return };
                if self
                    .registry
                    .lock()
                    .unwrap()
                    .register(ProcessSlot::DeviceLogs, pid)
                    .is_err()
                {
                    request_tree_termination(pid);
                    return;
                }
                relay::attach_device(&mut child, LogSource::from(platform), &self.events);
                self.spawn_exit_monitor(ProcessSlot::DeviceLogs, child, pid);
            }
        }
    }

    fn stop_device_logs(&self) {
        let pid = self.registry.lock().unwrap().unregister(ProcessSlot::DeviceLogs);
        if let Some(pid) = pid {
            request_tree_termination(pid);
        }
    }

    // ---- install & recovery ----------------------------------------------

    /// Run the detected package manager's install command to completion,
    /// relaying its output as bundler-sourced logs.
    ///
    /// Returns whether the install succeeded.
    pub async fn run_install(&self) -> bool {
        let command = match &self.config.install_override {
            Some(command) => command.clone(),
            None => {
                let derived = self.env.package_manager.install_command();
                let Some(command) = CommandSpec::parse(derived) else {
                    return false;
                };
                command
            }
        };
        let install = command.to_string();

        self.log_system(LogLevel::Info, format!("running {install}..."));
        self.report_status(ProcessSlot::Bundler, ProcessStatus::Building, None);

        match self.spawn_child(&command, &self.env.project_root) {
            Err(e) => {
                self.log_system(LogLevel::Error, format!("{install} failed: {e}"));
                self.report_status(ProcessSlot::Bundler, ProcessStatus::Error, None);
                false
            }
            Ok(mut child) => {
                relay::attach(&mut child, LogSource::Bundler, &self.events);
                match child.wait().await {
                    Ok(status) if status.success() => {
                        self.log_system(LogLevel::Info, format!("{install} completed"));
                        self.report_status(ProcessSlot::Bundler, ProcessStatus::Idle, None);
                        true
                    }
                    Ok(status) => {
                        self.log_system(
                            LogLevel::Error,
                            format!("{install} failed with {}", describe_exit(status.code())),
                        );
                        self.report_status(ProcessSlot::Bundler, ProcessStatus::Error, None);
                        false
                    }
                    Err(e) => {
                        self.log_system(LogLevel::Error, format!("{install} failed: {e}"));
                        self.report_status(ProcessSlot::Bundler, ProcessStatus::Error, None);
                        false
                    }
                }
            }
        }
    }

    /// Stop every owned process plus the device log stream. Detached
    /// bundlers are left alone - they are not ours to stop here.
    pub fn stop_all(&self) {
        self.stop_device_logs();

        for slot in [ProcessSlot::Bundler, ProcessSlot::Android, ProcessSlot::Ios] {
            let pid = {
                let mut registry = self.registry.lock().unwrap();
                if registry.owned_pid(slot).is_some() {
                    registry.unregister(slot)
                } else {
                    None
                }
            };
            if let Some(pid) = pid {
                self.log_system(LogLevel::Info, format!("stopping {}...", slot.name()));
                request_tree_termination(pid);
                self.report_status(slot, ProcessStatus::Idle, None);
            }
        }
    }

    /// The recovery workflow: stop everything, delete the dependency and
    /// native build caches, reinstall, and restart the bundler with a fresh
    /// cache. An install failure reports `Error` on the bundler slot and
    /// halts - no restart is attempted. Deletions are idempotent, so an
    /// interrupted reset is safe to run again.
    pub async fn full_reset(&self) {
        self.stop_all();
        self.log_system(LogLevel::Warn, "full reset started");

        for path in self.reset_targets() {
            if !path.exists() {
                continue;
            }
            let shown = path
                .strip_prefix(&self.env.project_root)
                .unwrap_or(&path)
                .display()
                .to_string();
            self.log_system(LogLevel::Info, format!("removing {shown}"));

            let target = path.clone();
            let removed = tokio::task::spawn_blocking(move || std::fs::remove_dir_all(&target)).await;
            match removed {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {}
                Ok(Err(e)) => {
                    self.log_system(LogLevel::Warn, format!("could not remove {shown}: {e}"));
                }
                Err(e) => warn!(error = %e, "cache removal task failed"),
            }
        }

        if self.run_install().await {
            self.log_system(LogLevel::Info, "reinstall complete, restarting metro");
            self.start_bundler(true);
        }
    }

    /// Directories the recovery workflow deletes.
    fn reset_targets(&self) -> Vec<PathBuf> {
        let mut targets = vec![self.env.app_root.join(&self.config.dependency_dir)];
        targets.extend(
            self.config
                .native_build_dirs
                .iter()
                .map(|dir| self.env.app_root.join(dir)),
        );
        if let Some(module) = &self.config.stale_native_module {
            targets.push(
                self.env
                    .project_root
                    .join(&self.config.dependency_dir)
                    .join(module)
                    .join("android")
                    .join("build"),
            );
        }
        targets
    }

    // ---- internals -------------------------------------------------------

    fn spawn_child(&self, command: &CommandSpec, cwd: &std::path::Path) -> io::Result<Child> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so one group signal covers the whole tree.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd.spawn()
    }

    /// Watch for the child's exit and report it, unless a stop or detach
    /// removed the registry entry first.
    fn spawn_exit_monitor(&self, slot: ProcessSlot, mut child: Child, pid: u32) {
        let registry = Arc::clone(&self.registry);
        let events = Arc::clone(&self.events);
        let handle = tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    debug!(error = %e, slot = slot.name(), "wait for child failed");
                    None
                }
            };

            if !registry.lock().unwrap().reap(slot, pid) {
                // Stop or detach won the race; nothing left to report.
                return;
            }
            if slot == ProcessSlot::DeviceLogs {
                return;
            }

            let clean = code.is_none() || code == Some(0);
            let status = if clean {
                ProcessStatus::Idle
            } else {
                ProcessStatus::Error
            };
            let level = if clean { LogLevel::Info } else { LogLevel::Error };
            let source = match slot {
                ProcessSlot::Bundler => LogSource::Bundler,
                ProcessSlot::Android => LogSource::Android,
                _ => LogSource::Ios,
            };

            registry.lock().unwrap().set_status(slot, status);
            events.log(&LogRecord::new(
                source,
                level,
                format!("{} exited with {}", slot.name(), describe_exit(code)),
            ));
            events.status(slot, status, None);
        });
        self.registry.lock().unwrap().attach_monitor(slot, handle);
    }

    fn report_spawn_failure(&self, slot: ProcessSlot, name: &str, error: &io::Error) {
        self.log_system(LogLevel::Error, format!("failed to start {name}: {error}"));
        self.report_status(slot, ProcessStatus::Error, None);
    }

    fn report_status(&self, slot: ProcessSlot, status: ProcessStatus, pid: Option<u32>) {
        self.registry.lock().unwrap().set_status(slot, status);
        self.events.status(slot, status, pid);
    }

    fn log_system(&self, level: LogLevel, text: impl Into<String>) {
        self.events.log(&LogRecord::system(level, text));
    }

    fn clear_pid_file(&self) {
        if let Err(e) = pidfile::clear_pid(&self.env.app_root) {
            warn!(error = %e, "could not remove metro pid file");
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
}
