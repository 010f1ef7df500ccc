// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tetherd - The session keepalive daemon.
//!
//! Keeps one backend session alive: routine reauth, periodic health probes,
//! escalation to full re-establishment, and resync after every recovery.
//! State (log, lock, PID) lives in `~/.local/state/tether/` by default.
//!
//! Usage:
//!   tetherd [--config <path>] [--state-dir <path>] [--verbose]

mod config;
mod device;
mod env;
mod error;
mod http;
mod instance;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tether_core::{Controller, Scheduler};

use config::Config;
use error::Result;
use http::HttpSessionClient;
use instance::InstanceGuard;

/// Log filename within the state directory.
const LOG_NAME: &str = "tetherd.log";

/// tetherd: Session keepalive and resynchronization daemon
#[derive(Parser, Debug)]
#[command(name = "tetherd", version)]
#[command(about = "Keeps a messaging backend session alive and in sync")]
struct Args {
    /// Path to config.toml (default: TETHER_CONFIG, then <config_dir>/tether/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the log, lock and PID files
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let state_dir = env::resolve_state_dir(args.state_dir.clone());
    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("tetherd: cannot create {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    setup_logging(&state_dir.join(LOG_NAME), args.verbose);
    tracing::info!("tetherd starting, state_dir={}", state_dir.display());

    if let Err(e) = run(&args, &state_dir).await {
        tracing::error!("{}", e);
        eprintln!("tetherd: {}", e);
        std::process::exit(1);
    }
    tracing::info!("tetherd stopped");
}

async fn run(args: &Args, state_dir: &Path) -> Result<()> {
    let config = Config::resolve(args.config.as_deref())?;
    let _instance = InstanceGuard::acquire(state_dir)?;

    let client = HttpSessionClient::new(&config.backend)?;
    tracing::info!("  Backend: {}", config.backend.url);

    let controller = Arc::new(Controller::new(client, config.policy, config.schedule)?);
    tracing::info!("  Protocol: {}", controller.profile().version);

    let scheduler = Scheduler::start(controller).await;
    wait_for_shutdown_signal().await?;

    tracing::info!("shutting down");
    scheduler.shutdown().await;
    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

fn setup_logging(log_path: &Path, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
