// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dq ingress (dq-ingress)
//!
//! Receives signed GitHub push notifications and marks projects pending.

use dq_ingress::{router, AppState, IngressConfig};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("dq-ingress {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("dq-ingress {}", env!("CARGO_PKG_VERSION"));
                println!("Accepts signed GitHub push webhooks and queues deploys");
                println!();
                println!("USAGE:");
                println!("    dq-ingress");
                println!();
                println!("ENVIRONMENT:");
                println!("    GITHUB_WEBHOOK_SECRET   Shared HMAC secret (required)");
                println!("    DQ_BIND_ADDR            Listen address [default: 0.0.0.0:8000]");
                println!("    DQ_MAILBOX_ROOT         Mailbox directory [default: /app/webhook_jobs]");
                println!("    DQ_DEPLOY_BRANCH        Branch that deploys [default: main]");
                println!("    DQ_IDENTITY_PATTERN     Allowed repository names");
                println!("    DQ_MAX_BODY_BYTES       Request body limit [default: 26214400]");
                println!("    RUST_LOG                Log filter [default: info]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: dq-ingress [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();

    let config = match IngressConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    std::fs::create_dir_all(&config.settings.mailbox_root)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        mailbox = %config.settings.mailbox_root.display(),
        branch = %config.settings.deploy_branch,
        "dq-ingress listening"
    );

    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("dq-ingress stopped");
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();
}

/// Resolves on SIGTERM or SIGINT. In-flight requests finish first.
async fn shutdown_signal() {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        error!("failed to install signal handlers");
        std::future::pending::<()>().await;
        return;
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
    }
}
