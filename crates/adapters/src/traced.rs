// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::deploy::{DeployAdapter, DeployError, DeployStatus};
use crate::git::{GitAdapter, SyncError};
use crate::subprocess::tail_lines;
use async_trait::async_trait;
use dq_core::DeployBranch;
use std::path::Path;
use tracing::Instrument;

/// Lines of deploy stderr kept in the failure log line
const STDERR_TAIL_LINES: usize = 20;

/// Wrapper that adds tracing to any GitAdapter
#[derive(Clone)]
pub struct TracedGit<G> {
    inner: G,
}

impl<G> TracedGit<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: GitAdapter> GitAdapter for TracedGit<G> {
    async fn sync(
        &self,
        workdir: &Path,
        remote: &str,
        branch: &DeployBranch,
    ) -> Result<String, SyncError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.sync(workdir, remote, branch).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(head) => tracing::info!(head = head.as_str(), elapsed_ms, "synced"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "sync failed"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "git.sync",
            workdir = %workdir.display(),
            remote,
            branch = %branch
        ))
        .await
    }
}

/// Wrapper that adds tracing to any DeployAdapter
#[derive(Clone)]
pub struct TracedDeploy<D> {
    inner: D,
}

impl<D> TracedDeploy<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DeployAdapter> DeployAdapter for TracedDeploy<D> {
    async fn run(&self, workdir: &Path, entry_point: &Path) -> Result<DeployStatus, DeployError> {
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.run(workdir, entry_point).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(status) if status.success() => {
                    tracing::info!(elapsed_ms, "deploy procedure succeeded");
                    tracing::debug!(stdout = %tail_lines(&status.stdout, STDERR_TAIL_LINES));
                }
                Ok(status) => tracing::error!(
                    elapsed_ms,
                    exit_code = ?status.exit_code,
                    stderr = %tail_lines(&status.stderr, STDERR_TAIL_LINES),
                    "deploy procedure failed"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "deploy procedure did not complete"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "deploy.run",
            workdir = %workdir.display(),
            entry_point = %entry_point.display()
        ))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
