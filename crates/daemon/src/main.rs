// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unlist agent daemon (uld)
//!
//! Background process that owns the agent, its periodic trigger and the
//! single-instance lock.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use ul_daemon::{
    exit_code, render_summary, run_once, startup, DaemonConfig, LifecycleError, OnceMode,
    DEFAULT_CONFIG_FILE,
};

const USAGE: &str = "usage: uld [--config <path>] [--once <immediate|scheduled|opt-out>] [--show-ui]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    once: Option<OnceMode>,
    show_ui: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--once" => {
                let mode = args.next().ok_or("--once needs a mode")?;
                parsed.once = Some(mode.parse().map_err(|e| format!("{e}"))?);
            }
            "--show-ui" => parsed.show_ui = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("uld: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = DaemonConfig::load(&config_path)?;

    // Write startup marker to log (before tracing setup, so it leads the attempt)
    write_startup_marker(&config.paths.log_file)?;

    let log_guard = setup_logging(&config.paths.log_file)?;

    info!(config = %config_path.display(), "starting uld");

    let state = match startup(&config) {
        Ok(state) => state,
        Err(e) => {
            // Tracing is non-blocking and may not flush in time
            write_startup_error(&config.paths.log_file, &e);
            error!("Failed to start agent: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    if let Some(mode) = args.once {
        let show_ui = args.show_ui || config.agent.show_ui;
        let errors = run_once(&state.agent, mode, show_ui).await?;
        print!("{}", render_summary(errors.as_ref()));
        state.shutdown();
        let code = exit_code(errors.as_ref());
        return Ok(ExitCode::from(code));
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let started = state.agent.agent_finished_launching().await?;
    info!(started, "agent ready");

    // Signal ready for parent process (e.g., systemd, scripts waiting for startup)
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }

    state.shutdown();
    info!("uld stopped");
    Ok(ExitCode::SUCCESS)
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- uld: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- uld: starting (pid: ";

fn write_startup_marker(log_path: &Path) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to the log file
fn write_startup_error(log_path: &Path, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start agent: {}", error);
}

fn setup_logging(
    log_path: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().ok_or(LifecycleError::NoLogDir)?,
        log_path.file_name().ok_or(LifecycleError::NoLogDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
