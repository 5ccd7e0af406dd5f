// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `git` command-line adapter

use super::{GitAdapter, SyncError};
use crate::subprocess::{run_with_timeout, tail_lines, GIT_TIMEOUT};
use async_trait::async_trait;
use dq_core::DeployBranch;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Sync via the `git` binary on `PATH`
#[derive(Clone)]
pub struct GitCliAdapter {
    timeout: Duration,
}

impl Default for GitCliAdapter {
    fn default() -> Self {
        Self {
            timeout: GIT_TIMEOUT,
        }
    }
}

impl GitCliAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound for each individual git command.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn git(&self, workdir: &Path, args: &[&str]) -> Result<Output, SyncError> {
        let description = format!("git {}", args.join(" "));
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(std::process::Stdio::null());

        let output = run_with_timeout(cmd, self.timeout, &description).await?;
        if !output.status.success() {
            return Err(SyncError::Failed {
                command: description,
                status: output.status.to_string(),
                stderr: tail_lines(&output.stderr, 5),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl GitAdapter for GitCliAdapter {
    async fn sync(
        &self,
        workdir: &Path,
        remote: &str,
        branch: &DeployBranch,
    ) -> Result<String, SyncError> {
        if !workdir.is_dir() {
            return Err(SyncError::MissingWorkingCopy(workdir.to_path_buf()));
        }

        // Explicit refspec so the tracking ref updates regardless of the
        // remote's configured fetch refspecs.
        let tracking = format!("refs/remotes/{}/{}", remote, branch);
        let refspec = format!("+{}:{}", branch.ref_name(), tracking);
        self.git(workdir, &["fetch", "--quiet", remote, &refspec])
            .await?;
        self.git(workdir, &["reset", "--hard", "--quiet", &tracking])
            .await?;

        let output = self.git(workdir, &["rev-parse", "HEAD"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
