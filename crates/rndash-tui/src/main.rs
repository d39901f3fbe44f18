//! rndash binary entry point.
//!
//! Wires the supervisor to the dashboard: environment detection, tracing to
//! file, the UI event channel, the git poller, and a one-time reattach
//! attempt for a bundler left behind by a previous session.

mod app;
mod cli;
mod dashboard;
mod events;
mod git;
mod i18n;
mod prefs;
mod ui;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use rndash_core::config::SupervisorConfig;
use rndash_core::env::detect_environment;
use rndash_core::paths;
use rndash_runtime::Supervisor;

use crate::cli::Cli;
use crate::events::ChannelEvents;

/// Tracing goes to a file only; stdout belongs to the alternate screen for
/// the whole session. The returned guard must stay alive until exit.
fn init_tracing(verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let log_path = paths::log_file_path().context("resolve log file path")?;
    let log_dir = log_path
        .parent()
        .context("log file path has no parent directory")?;
    std::fs::create_dir_all(log_dir).context("create data directory")?;

    let file_appender = tracing_appender::rolling::never(
        log_dir,
        log_path
            .file_name()
            .context("log file path has no file name")?
            .to_owned(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.verbose)?;

    let cwd = match cli.project {
        Some(path) => path
            .canonicalize()
            .with_context(|| format!("project directory {} not found", path.display()))?,
        None => env::current_dir().context("read current directory")?,
    };

    let locale = cli
        .lang
        .as_deref()
        .map_or_else(i18n::detect, i18n::for_tag);

    let rn_env = detect_environment(&cwd);
    info!(
        app_root = %rn_env.app_root.display(),
        package_manager = rn_env.package_manager.name(),
        monorepo = rn_env.is_monorepo,
        "starting rndash"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let events = Arc::new(ChannelEvents::new(tx.clone()));
    let supervisor = Arc::new(Supervisor::new(
        SupervisorConfig::default(),
        rn_env.clone(),
        events,
    ));

    git::spawn_poller(rn_env.project_root.clone(), tx);

    // Pick up a bundler detached by a previous session before the first
    // frame, so the status panel never flashes idle for a live process.
    if supervisor.reattach_bundler() {
        info!("reattached to a detached bundler");
    }

    let handle = tokio::runtime::Handle::current();
    let ui_supervisor = Arc::clone(&supervisor);
    let ui_env = rn_env;
    let ui = std::thread::spawn(move || {
        dashboard::run(&ui_supervisor, &handle, ui_env, locale, rx)
    });

    match tokio::task::spawn_blocking(move || ui.join()).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) | Err(_) => anyhow::bail!("dashboard thread panicked"),
    }
}
