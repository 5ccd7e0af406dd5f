// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher lifecycle: configuration, logging, startup.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use dq_adapters::{GitCliAdapter, ScriptDeployAdapter, TracedDeploy, TracedGit};
use dq_core::{ConfigError, Settings};
use dq_storage::{Mailbox, MailboxError};
use thiserror::Error;
use tracing::info;

use crate::env;
use crate::watcher::{Watcher, WatcherConfig};

/// Watcher with the production adapters (wrapped with tracing)
pub type DeployWatcher = Watcher<TracedGit<GitCliAdapter>, TracedDeploy<ScriptDeployAdapter>>;

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- dq-watcher: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- dq-watcher: starting (pid: ";

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Mailbox root, deploy branch, identity pattern
    pub settings: Settings,
    /// Parent of the per-project working copies
    pub projects_root: PathBuf,
    /// Root state directory (e.g. ~/.local/state/dq)
    pub state_dir: PathBuf,
    /// Directory of per-project lock files
    pub lock_dir: PathBuf,
    /// Path to the watcher log file
    pub log_path: PathBuf,
    pub poll_interval: Duration,
    pub deploy_script: PathBuf,
    pub deploy_timeout: Duration,
    pub git_timeout: Duration,
    pub git_remote: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;

        Ok(Self {
            settings: Settings::from_env()?,
            projects_root: env::projects_root(),
            lock_dir: state_dir.join("locks"),
            log_path: state_dir.join("watcher.log"),
            state_dir,
            poll_interval: env::poll_interval()?,
            deploy_script: env::deploy_script()?,
            deploy_timeout: env::deploy_timeout()?,
            git_timeout: env::git_timeout()?,
            git_remote: env::git_remote(),
        })
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            mailbox_root: self.settings.mailbox_root.clone(),
            identity_pattern: self.settings.identity_pattern.clone(),
            lock_dir: self.lock_dir.clone(),
            projects_root: self.projects_root.clone(),
            deploy_script: self.deploy_script.clone(),
            remote: self.git_remote.clone(),
            branch: self.settings.deploy_branch.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prepare directories, drop leftovers of interrupted clears, and build
/// the watcher with the production adapters.
pub fn startup(config: &Config) -> Result<DeployWatcher, LifecycleError> {
    std::fs::create_dir_all(&config.settings.mailbox_root)?;
    std::fs::create_dir_all(&config.lock_dir)?;

    let mailbox = Mailbox::new(config.settings.mailbox_root.clone());
    let swept = mailbox.sweep_tombstones()?;
    if swept > 0 {
        info!(swept, "removed leftover claimed slots");
    }

    let git = TracedGit::new(GitCliAdapter::new().with_timeout(config.git_timeout));
    let deploy = TracedDeploy::new(ScriptDeployAdapter::new().with_timeout(config.deploy_timeout));
    Ok(Watcher::new(config.watcher_config(), git, deploy))
}

/// Append the startup marker to the log file
pub fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write a startup error synchronously; the tracing writer is non-blocking
/// and may not flush before the process exits.
pub fn write_startup_error(config: &Config, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start watcher: {}", error);
}

/// Log to stderr and append to `config.log_path`.
pub fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(LifecycleError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(
        dir,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
