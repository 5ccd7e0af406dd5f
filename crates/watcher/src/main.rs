// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dq watcher (dq-watcher)
//!
//! Long-running poll loop that deploys projects the ingress marked pending.

use std::sync::Arc;

use dq_watcher::lifecycle::{self, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut once = false;
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("dq-watcher {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "--once" => once = true,
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: dq-watcher [--once | --help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    write_startup_marker_or_warn(&config);
    let log_guard = lifecycle::setup_logging(&config)?;

    let watcher = match lifecycle::startup(&config) {
        Ok(watcher) => watcher,
        Err(e) => {
            lifecycle::write_startup_error(&config, &e);
            error!("Failed to start watcher: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    info!(
        projects = %config.projects_root.display(),
        branch = %config.settings.deploy_branch,
        remote = config.git_remote.as_str(),
        "dq-watcher started"
    );

    if once {
        match watcher.run_cycle().await {
            Ok(reports) => {
                for report in &reports {
                    info!(project = %report.project, outcome = ?report.outcome, "cycle report");
                }
                info!(projects = reports.len(), "cycle complete");
            }
            Err(e) => error!(error = %e, "failed to scan mailbox"),
        }
        return Ok(());
    }

    let shutdown = Arc::new(Notify::new());
    spawn_signal_handler(Arc::clone(&shutdown))?;

    watcher.run(shutdown).await;
    info!("dq-watcher stopped");
    Ok(())
}

fn print_help() {
    println!("dq-watcher {}", env!("CARGO_PKG_VERSION"));
    println!("Deploys projects marked pending by dq-ingress");
    println!();
    println!("USAGE:");
    println!("    dq-watcher [--once]");
    println!();
    println!("ENVIRONMENT:");
    println!("    DQ_MAILBOX_ROOT          Mailbox directory [default: /app/webhook_jobs]");
    println!("    DQ_PROJECTS_ROOT         Parent of working copies [default: /srv/projects]");
    println!("    DQ_STATE_DIR             Locks and log [default: ~/.local/state/dq]");
    println!("    DQ_DEPLOY_BRANCH         Branch to deploy [default: main]");
    println!("    DQ_GIT_REMOTE            Remote to fetch [default: origin]");
    println!("    DQ_DEPLOY_SCRIPT         Entry point in the working copy [default: deploy.sh]");
    println!("    DQ_POLL_INTERVAL_SECS    Poll interval [default: 60]");
    println!("    DQ_DEPLOY_TIMEOUT_SECS   Deploy time limit [default: 1800]");
    println!("    DQ_GIT_TIMEOUT_SECS      Per git command time limit [default: 300]");
    println!("    RUST_LOG                 Log filter [default: info]");
    println!();
    println!("OPTIONS:");
    println!("        --once       Run a single poll cycle and exit");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

fn write_startup_marker_or_warn(config: &Config) {
    if let Err(e) = lifecycle::write_startup_marker(config) {
        eprintln!("warning: could not write startup marker: {e}");
    }
}

/// Notify `shutdown` on the first SIGTERM or SIGINT.
fn spawn_signal_handler(shutdown: Arc<Notify>) -> Result<(), LifecycleError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
        warn!("no new deploys will start; waiting for running ones");
        shutdown.notify_one();
    });
    Ok(())
}
