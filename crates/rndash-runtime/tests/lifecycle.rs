//! End-to-end lifecycle tests driving real child processes.
//!
//! The supervisor is configured with plain shell commands (`sleep` standing
//! in for the bundler, `exit N` for builds and installs) and a recording
//! event sink, so every status transition and log record can be asserted.
//! Tests that touch the pid file isolate the data root through
//! `RNDASH_DATA_DIR` and serialize on the shared env lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::sleep;

use rndash_core::config::{CommandSpec, SupervisorConfig};
use rndash_core::env::{PackageManager, RnEnvironment};
use rndash_core::events::SupervisorEvents;
use rndash_core::logs::{LogLevel, LogRecord, LogSource};
use rndash_core::paths::DATA_DIR_ENV;
use rndash_core::paths::test_utils::{ENV_LOCK, EnvVarGuard};
use rndash_core::process::{Platform, ProcessSlot, ProcessStatus};
use rndash_runtime::pidfile;
use rndash_runtime::supervisor::Supervisor;
use rndash_runtime::OrphanScanner;

#[derive(Default)]
struct RecordingEvents {
    logs: Mutex<Vec<LogRecord>>,
    statuses: Mutex<Vec<(ProcessSlot, ProcessStatus, Option<u32>)>>,
}

impl SupervisorEvents for RecordingEvents {
    fn log(&self, record: &LogRecord) {
        self.logs.lock().unwrap().push(record.clone());
    }
    fn status(&self, slot: ProcessSlot, status: ProcessStatus, pid: Option<u32>) {
        self.statuses.lock().unwrap().push((slot, status, pid));
    }
}

impl RecordingEvents {
    fn statuses_for(&self, slot: ProcessSlot) -> Vec<(ProcessStatus, Option<u32>)> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _, _)| *s == slot)
            .map(|(_, status, pid)| (*status, *pid))
            .collect()
    }

    fn has_log_containing(&self, needle: &str) -> bool {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .any(|record| record.text.contains(needle))
    }

    fn logs_from(&self, source: LogSource) -> Vec<LogRecord> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.source == source)
            .cloned()
            .collect()
    }
}

/// Scanner whose candidate list the test controls.
#[derive(Default, Clone)]
struct SharedScanner {
    pids: Arc<Mutex<Vec<u32>>>,
}

impl SharedScanner {
    fn set(&self, pids: Vec<u32>) {
        *self.pids.lock().unwrap() = pids;
    }
}

impl OrphanScanner for SharedScanner {
    fn candidates(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }
}

fn shell(script: &str) -> CommandSpec {
    CommandSpec::new("sh", &["-c", script])
}

fn test_config() -> SupervisorConfig {
    SupervisorConfig {
        // `sh -c` ignores extra trailing args, so the cache-reset flag is harmless.
        bundler: shell("sleep 300"),
        bundler_cache_reset_flag: "--reset-cache".to_string(),
        android_build: shell("exit 0"),
        ios_build: shell("exit 0"),
        android_device_logs: shell("sleep 300"),
        ios_device_logs: shell("sleep 300"),
        orphan_signature: vec!["rndash-test-never-matches".to_string()],
        dependency_dir: "node_modules".to_string(),
        native_build_dirs: vec![PathBuf::from("android/build")],
        stale_native_module: None,
        install_override: Some(shell("exit 0")),
    }
}

fn test_env(root: &Path) -> RnEnvironment {
    RnEnvironment {
        package_manager: PackageManager::Npm,
        is_monorepo: false,
        project_root: root.to_path_buf(),
        app_root: root.to_path_buf(),
        node_version: None,
    }
}

struct Harness {
    _data_dir: TempDir,
    _env_guard: EnvVarGuard,
    project: TempDir,
    events: Arc<RecordingEvents>,
    scanner: SharedScanner,
    supervisor: Supervisor,
}

impl Harness {
    fn new(config: SupervisorConfig) -> Self {
        let data_dir = TempDir::new().unwrap();
        let env_guard = EnvVarGuard::set(DATA_DIR_ENV, data_dir.path().to_string_lossy().as_ref());
        let project = TempDir::new().unwrap();
        let events = Arc::new(RecordingEvents::default());
        let scanner = SharedScanner::default();
        let supervisor = Supervisor::with_scanner(
            config,
            test_env(project.path()),
            events.clone(),
            Arc::new(scanner.clone()),
        );
        Self {
            _data_dir: data_dir,
            _env_guard: env_guard,
            project,
            events,
            scanner,
            supervisor,
        }
    }

    /// Fresh supervisor over the same project and data dir, with its own
    /// event recorder - simulates an rndash restart.
    fn fresh_supervisor(&self, config: SupervisorConfig) -> (Supervisor, Arc<RecordingEvents>) {
        let events = Arc::new(RecordingEvents::default());
        let supervisor = Supervisor::with_scanner(
            config,
            test_env(self.project.path()),
            events.clone(),
            Arc::new(self.scanner.clone()),
        );
        (supervisor, events)
    }
}

async fn wait_for_status(events: &RecordingEvents, slot: ProcessSlot, wanted: ProcessStatus) {
    for _ in 0..200 {
        if events
            .statuses_for(slot)
            .iter()
            .any(|(status, _)| *status == wanted)
        {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("{} never reached {:?}", slot.name(), wanted);
}

async fn wait_until_dead(pid: u32) {
    for _ in 0..200 {
        if !pidfile::pid_alive(pid) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("pid {pid} still alive");
}

#[tokio::test]
async fn start_emits_building_then_running() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);

    let statuses = h.events.statuses_for(ProcessSlot::Bundler);
    let pid = h.supervisor.bundler_pid().expect("no bundler pid");
    assert_eq!(
        statuses,
        vec![
            (ProcessStatus::Building, None),
            (ProcessStatus::Running, Some(pid)),
        ]
    );

    h.supervisor.stop_bundler();
}

#[tokio::test]
async fn start_while_running_is_a_noop() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);
    let before = h.events.statuses_for(ProcessSlot::Bundler).len();
    h.supervisor.start_bundler(false);
    assert_eq!(h.events.statuses_for(ProcessSlot::Bundler).len(), before);

    h.supervisor.stop_bundler();
}

#[tokio::test]
async fn stop_leaves_idle_and_no_pid_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);
    let pid = h.supervisor.bundler_pid().unwrap();
    h.supervisor.stop_bundler();

    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Bundler),
        ProcessStatus::Idle
    );
    assert_eq!(h.supervisor.bundler_pid(), None);
    assert_eq!(pidfile::read_pid(h.project.path()).unwrap(), None);
    wait_until_dead(pid).await;

    // Stopping again is a no-op, not an error.
    h.supervisor.stop_bundler();
}

#[tokio::test]
async fn detach_persists_pid_and_releases_the_handle() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);
    let pid = h.supervisor.bundler_pid().unwrap();
    h.supervisor.detach_bundler();

    assert!(!h.supervisor.owns(ProcessSlot::Bundler));
    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Bundler),
        ProcessStatus::Detached
    );
    assert_eq!(pidfile::read_pid(h.project.path()).unwrap(), Some(pid));
    assert!(pidfile::pid_alive(pid), "detach must not kill the process");

    // A detached pid is still stoppable; this also cleans up the child.
    h.supervisor.stop_bundler();
    wait_until_dead(pid).await;
}

#[tokio::test]
async fn reattach_recovers_a_detached_bundler_across_restarts() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);
    let pid = h.supervisor.bundler_pid().unwrap();
    h.supervisor.detach_bundler();

    let (fresh, events) = h.fresh_supervisor(test_config());
    assert!(fresh.reattach_bundler());
    assert_eq!(
        events.statuses_for(ProcessSlot::Bundler),
        vec![(ProcessStatus::Running, Some(pid))]
    );

    // Starting now must not create a second owned handle.
    fresh.start_bundler(false);
    assert!(!fresh.owns(ProcessSlot::Bundler));
    assert!(events.has_log_containing("already running"));

    fresh.stop_bundler();
    wait_until_dead(pid).await;
}

#[tokio::test]
async fn reattach_repairs_a_stale_pid_file_silently() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    // A pid that cannot exist: beyond any real pid range on test machines.
    pidfile::write_pid(h.project.path(), 999_999).unwrap();

    assert!(!h.supervisor.reattach_bundler());
    assert_eq!(pidfile::read_pid(h.project.path()).unwrap(), None);
    assert!(h.events.has_log_containing("stale"));
    // Repair is informational, never an error.
    assert!(
        h.events
            .logs
            .lock()
            .unwrap()
            .iter()
            .all(|record| record.level != LogLevel::Error)
    );
}

#[tokio::test]
async fn reattach_falls_back_to_the_orphan_scan() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    let mut stray = tokio::process::Command::new("sleep")
        .arg("300")
        .spawn()
        .unwrap();
    let stray_pid = stray.id().unwrap();
    h.scanner.set(vec![stray_pid]);

    assert!(h.supervisor.reattach_bundler());
    assert_eq!(
        h.events.statuses_for(ProcessSlot::Bundler),
        vec![(ProcessStatus::Running, Some(stray_pid))]
    );
    // Best-effort adoption is flagged as a warning.
    assert!(
        h.events
            .logs
            .lock()
            .unwrap()
            .iter()
            .any(|record| record.level == LogLevel::Warn && record.text.contains("orphan"))
    );

    stray.kill().await.ok();
    stray.wait().await.ok();
}

#[tokio::test]
async fn kill_orphans_spares_the_owned_bundler() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    // Owned bundler: must survive.
    h.supervisor.start_bundler(false);
    let owned_pid = h.supervisor.bundler_pid().unwrap();

    // A stray process the scanner reports alongside the owned pid.
    let mut stray = tokio::process::Command::new("sleep")
        .arg("300")
        .spawn()
        .unwrap();
    let stray_pid = stray.id().unwrap();
    h.scanner.set(vec![owned_pid, stray_pid]);

    assert_eq!(h.supervisor.kill_orphans(), 1);
    assert!(pidfile::pid_alive(owned_pid), "owned pid must be spared");
    stray.wait().await.ok();

    h.supervisor.stop_bundler();
    wait_until_dead(owned_pid).await;
}

#[tokio::test]
async fn kill_orphans_targets_a_detached_pid() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.start_bundler(false);
    let pid = h.supervisor.bundler_pid().unwrap();
    h.supervisor.detach_bundler();
    h.scanner.set(vec![pid]);

    assert_eq!(h.supervisor.kill_orphans(), 1);
    wait_until_dead(pid).await;
    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Bundler),
        ProcessStatus::Idle
    );
    assert_eq!(pidfile::read_pid(h.project.path()).unwrap(), None);
    assert_eq!(h.supervisor.bundler_pid(), None);
}

#[tokio::test]
async fn build_reports_building_then_idle_on_success() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.run_build(Platform::Android);
    wait_for_status(&h.events, ProcessSlot::Android, ProcessStatus::Idle).await;

    let statuses: Vec<ProcessStatus> = h
        .events
        .statuses_for(ProcessSlot::Android)
        .iter()
        .map(|(status, _)| *status)
        .collect();
    assert_eq!(statuses, vec![ProcessStatus::Building, ProcessStatus::Idle]);

    // Building is single-fire: never two in a row.
    for pair in statuses.windows(2) {
        assert!(pair[0] != ProcessStatus::Building || pair[1] != ProcessStatus::Building);
    }

    // Spawn confirmation also started the device log stream.
    assert!(h.supervisor.owns(ProcessSlot::DeviceLogs));
    h.supervisor.stop_all();
}

#[tokio::test]
async fn failing_build_reports_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    let mut config = test_config();
    config.ios_build = shell("exit 3");
    let h = Harness::new(config);

    h.supervisor.run_build(Platform::Ios);
    wait_for_status(&h.events, ProcessSlot::Ios, ProcessStatus::Error).await;

    let ios_logs = h.events.logs_from(LogSource::Ios);
    assert!(
        ios_logs
            .iter()
            .any(|record| record.level == LogLevel::Error && record.text.contains("code 3"))
    );
    h.supervisor.stop_all();
}

#[tokio::test]
async fn build_spawn_failure_surfaces_as_error_status() {
    let _lock = ENV_LOCK.lock().unwrap();
    let mut config = test_config();
    config.android_build = CommandSpec::new("rndash-no-such-binary", &[]);
    let h = Harness::new(config);

    h.supervisor.run_build(Platform::Android);
    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Android),
        ProcessStatus::Error
    );
    assert!(h.events.has_log_containing("failed to start android"));
}

#[tokio::test]
async fn install_relays_output_as_bundler_logs() {
    let _lock = ENV_LOCK.lock().unwrap();
    let mut config = test_config();
    config.install_override = Some(shell("echo fetching packages"));
    let h = Harness::new(config);

    assert!(h.supervisor.run_install().await);
    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Bundler),
        ProcessStatus::Idle
    );

    // The relay may still be draining the pipe after process exit.
    for _ in 0..200 {
        if h
            .events
            .logs_from(LogSource::Bundler)
            .iter()
            .any(|record| record.text.contains("fetching packages"))
        {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("install output never relayed");
}

#[tokio::test]
async fn failed_install_halts_the_full_reset() {
    let _lock = ENV_LOCK.lock().unwrap();
    let mut config = test_config();
    config.install_override = Some(shell("exit 1"));
    let h = Harness::new(config);

    // Seed caches the reset should delete.
    let node_modules = h.project.path().join("node_modules");
    std::fs::create_dir_all(node_modules.join("left-pad")).unwrap();
    let gradle = h.project.path().join("android/build");
    std::fs::create_dir_all(&gradle).unwrap();

    h.supervisor.full_reset().await;

    assert!(!node_modules.exists());
    assert!(!gradle.exists());
    assert_eq!(
        h.supervisor.status_of(ProcessSlot::Bundler),
        ProcessStatus::Error
    );
    // No restart after a failed install.
    assert!(
        !h.events
            .statuses_for(ProcessSlot::Bundler)
            .iter()
            .any(|(status, _)| *status == ProcessStatus::Running)
    );
    assert!(!h.supervisor.owns(ProcessSlot::Bundler));
}

#[tokio::test]
async fn successful_full_reset_restarts_the_bundler() {
    let _lock = ENV_LOCK.lock().unwrap();
    let h = Harness::new(test_config());

    h.supervisor.full_reset().await;

    let statuses = h.events.statuses_for(ProcessSlot::Bundler);
    assert_eq!(
        statuses.last().map(|(status, _)| *status),
        Some(ProcessStatus::Running)
    );
    assert!(h.supervisor.owns(ProcessSlot::Bundler));

    h.supervisor.stop_bundler();
}

#[tokio::test]
async fn stop_all_stops_every_owned_slot() {
    let _lock = ENV_LOCK.lock().unwrap();
    let mut config = test_config();
    // Long-running builds so they are still owned when we stop.
    config.android_build = shell("sleep 300");
    config.ios_build = shell("sleep 300");
    let h = Harness::new(config);

    h.supervisor.start_bundler(false);
    h.supervisor.run_build(Platform::Android);
    h.supervisor.run_build(Platform::Ios);
    let bundler_pid = h.supervisor.bundler_pid().unwrap();

    h.supervisor.stop_all();

    for slot in [ProcessSlot::Bundler, ProcessSlot::Android, ProcessSlot::Ios] {
        assert_eq!(h.supervisor.status_of(slot), ProcessStatus::Idle);
        assert!(!h.supervisor.owns(slot));
    }
    assert!(!h.supervisor.owns(ProcessSlot::DeviceLogs));
    wait_until_dead(bundler_pid).await;
}
