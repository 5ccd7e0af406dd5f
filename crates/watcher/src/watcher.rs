// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll loop and the per-project deploy cycle.
//!
//! For every pending project the cycle runs, in its own task:
//! claim lock -> clear slot -> sync working copy -> deploy -> release lock.
//!
//! The slot is cleared only after the lock is held and before the working
//! copy is read, so a push that lands while a deploy is running leaves a
//! fresh slot for the next cycle, and a push absorbed by the clear is
//! covered because sync fetches the remote tip afterwards.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dq_adapters::{DeployAdapter, DeployError, GitAdapter};
use dq_core::{DeployBranch, IdentityPattern, ProjectId};
use dq_storage::{Mailbox, MailboxError, ProjectLocks};
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn, Instrument};

/// What one cycle did for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Synced to `head` and the deploy procedure exited 0
    Deployed { head: String, elapsed: Duration },
    /// Another cycle holds the project's lock; the slot is left pending
    Busy,
    LockFailed(String),
    ClearFailed(String),
    SyncFailed(String),
    /// Non-zero exit, signal, timeout, or an entry point that could not run
    DeployFailed {
        exit_code: Option<i32>,
        timed_out: bool,
        /// Why no exit code was produced; `None` for a plain non-zero exit
        reason: Option<String>,
    },
}

impl CycleOutcome {
    pub fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub project: ProjectId,
    pub outcome: CycleOutcome,
}

/// Paths and knobs of the poll loop
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub mailbox_root: PathBuf,
    pub identity_pattern: IdentityPattern,
    pub lock_dir: PathBuf,
    /// Working copy of project `id` is `projects_root/id`
    pub projects_root: PathBuf,
    /// Entry point relative to the working copy
    pub deploy_script: PathBuf,
    pub remote: String,
    pub branch: DeployBranch,
    pub poll_interval: Duration,
}

impl WatcherConfig {
    /// Defaults for everything but the three directories.
    pub fn new(
        mailbox_root: impl Into<PathBuf>,
        lock_dir: impl Into<PathBuf>,
        projects_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mailbox_root: mailbox_root.into(),
            identity_pattern: IdentityPattern::default(),
            lock_dir: lock_dir.into(),
            projects_root: projects_root.into(),
            deploy_script: PathBuf::from(crate::env::DEFAULT_DEPLOY_SCRIPT),
            remote: crate::env::DEFAULT_GIT_REMOTE.to_string(),
            branch: DeployBranch::default(),
            poll_interval: crate::env::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The watcher, generic over its git and deploy adapters
#[derive(Clone)]
pub struct Watcher<G, D> {
    config: Arc<WatcherConfig>,
    mailbox: Mailbox,
    locks: ProjectLocks,
    git: G,
    deploy: D,
}

impl<G: GitAdapter, D: DeployAdapter> Watcher<G, D> {
    pub fn new(config: WatcherConfig, git: G, deploy: D) -> Self {
        let mailbox =
            Mailbox::new(config.mailbox_root.clone()).with_pattern(config.identity_pattern.clone());
        let locks = ProjectLocks::new(config.lock_dir.clone());
        Self {
            config: Arc::new(config),
            mailbox,
            locks,
            git,
            deploy,
        }
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn locks(&self) -> &ProjectLocks {
        &self.locks
    }

    /// Run one poll cycle and wait for every project it started.
    ///
    /// Reports are sorted by project. Per-project failures are reported,
    /// never returned; only an unreadable mailbox is an error.
    pub async fn run_cycle(&self) -> Result<Vec<CycleReport>, MailboxError> {
        let mut tasks = JoinSet::new();
        self.spawn_pending(&mut tasks).await?;

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Some(report) = reap(joined) {
                reports.push(report);
            }
        }
        reports.sort_by(|a, b| a.project.cmp(&b.project));
        Ok(reports)
    }

    /// Poll until `shutdown` is notified, then wait for in-flight projects.
    ///
    /// Project tasks are not awaited by the tick that started them, so a
    /// slow deploy never delays scanning other projects.
    pub async fn run(&self, shutdown: Arc<Notify>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tasks = JoinSet::new();

        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            mailbox = %self.config.mailbox_root.display(),
            "watching for pending deploys"
        );

        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                _ = ticker.tick() => {
                    while let Some(joined) = tasks.try_join_next() {
                        reap(joined);
                    }
                    if let Err(e) = self.spawn_pending(&mut tasks).await {
                        error!(error = %e, "failed to scan mailbox");
                    }
                }
            }
        }

        if !tasks.is_empty() {
            info!(in_flight = tasks.len(), "waiting for in-flight deploys");
        }
        while let Some(joined) = tasks.join_next().await {
            reap(joined);
        }
    }

    async fn spawn_pending(&self, tasks: &mut JoinSet<CycleReport>) -> Result<(), MailboxError> {
        let mailbox = self.mailbox.clone();
        let pending = blocking(move || mailbox.list_pending())
            .await
            .map_err(|e| MailboxError::Io {
                path: self.config.mailbox_root.clone(),
                source: std::io::Error::other(e),
            })??;
        if pending.is_empty() {
            debug!("no pending deploys");
            return Ok(());
        }
        debug!(count = pending.len(), "pending deploys");

        for project in pending {
            let watcher = self.clone();
            let span = tracing::info_span!("project", project = %project);
            tasks.spawn(
                async move {
                    let outcome = watcher.process(&project).await;
                    CycleReport { project, outcome }
                }
                .instrument(span),
            );
        }
        Ok(())
    }

    /// Claim, clear, sync and deploy one project.
    ///
    /// The lock guard lives until this returns, whatever the outcome.
    pub async fn process(&self, project: &ProjectId) -> CycleOutcome {
        let locks = self.locks.clone();
        let id = project.clone();
        let acquired = blocking(move || locks.try_acquire(&id).map_err(|e| e.to_string()));
        let _guard = match acquired.await.and_then(|r| r) {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                debug!(
                    holder = self.locks.last_holder(project).as_deref(),
                    "lock busy, deferring"
                );
                return CycleOutcome::Busy;
            }
            Err(e) => {
                error!(error = %e, "failed to take lock");
                return CycleOutcome::LockFailed(e);
            }
        };

        let mailbox = self.mailbox.clone();
        let id = project.clone();
        let cleared = blocking(move || mailbox.clear(&id).map_err(|e| e.to_string()));
        if let Err(e) = cleared.await.and_then(|r| r) {
            error!(error = %e, "failed to clear pending slot");
            return CycleOutcome::ClearFailed(e);
        }

        let workdir = self.config.projects_root.join(project.as_str());
        let head = match self
            .git
            .sync(&workdir, &self.config.remote, &self.config.branch)
            .await
        {
            Ok(head) => head,
            Err(e) => {
                warn!(error = %e, "sync failed, skipping deploy");
                return CycleOutcome::SyncFailed(e.to_string());
            }
        };

        let start = Instant::now();
        let outcome = match self.deploy.run(&workdir, &self.config.deploy_script).await {
            Ok(status) if status.success() => CycleOutcome::Deployed {
                head,
                elapsed: start.elapsed(),
            },
            Ok(status) => CycleOutcome::DeployFailed {
                exit_code: status.exit_code,
                timed_out: false,
                reason: status
                    .exit_code
                    .is_none()
                    .then(|| "terminated by a signal".to_string()),
            },
            Err(e) => CycleOutcome::DeployFailed {
                exit_code: None,
                timed_out: matches!(e, DeployError::TimedOut(_)),
                reason: Some(e.to_string()),
            },
        };

        match &outcome {
            CycleOutcome::Deployed { head, elapsed } => info!(
                head = head.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                "deployed"
            ),
            CycleOutcome::DeployFailed {
                exit_code,
                timed_out,
                reason,
            } => error!(
                ?exit_code,
                timed_out,
                reason = reason.as_deref(),
                "deploy failed; not re-queued"
            ),
            _ => {}
        }
        outcome
    }
}

/// Run filesystem work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| e.to_string())
}

fn reap(joined: Result<CycleReport, JoinError>) -> Option<CycleReport> {
    match joined {
        Ok(report) => Some(report),
        Err(e) => {
            error!(error = %e, "project task failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
