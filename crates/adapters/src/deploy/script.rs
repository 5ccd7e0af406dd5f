// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable-in-the-working-copy deploy adapter

use super::{DeployAdapter, DeployError, DeployStatus};
use crate::subprocess::{run_with_timeout, DEPLOY_TIMEOUT};
use crate::SubprocessError;
use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs the entry point directly, inheriting the watcher's environment
#[derive(Clone)]
pub struct ScriptDeployAdapter {
    timeout: Duration,
}

impl Default for ScriptDeployAdapter {
    fn default() -> Self {
        Self {
            timeout: DEPLOY_TIMEOUT,
        }
    }
}

impl ScriptDeployAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DeployAdapter for ScriptDeployAdapter {
    async fn run(&self, workdir: &Path, entry_point: &Path) -> Result<DeployStatus, DeployError> {
        // The child resolves its program after changing directory, so a
        // relative working copy must be made absolute first.
        let workdir = match tokio::fs::canonicalize(workdir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeployError::MissingEntryPoint(workdir.join(entry_point)));
            }
            Err(e) => return Err(DeployError::Spawn(e.to_string())),
        };
        let program = workdir.join(entry_point);

        let meta = match tokio::fs::metadata(&program).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeployError::MissingEntryPoint(program));
            }
            Err(e) => return Err(DeployError::Spawn(e.to_string())),
        };
        if !meta.is_file() || meta.permissions().mode() & 0o111 == 0 {
            return Err(DeployError::NotExecutable(program));
        }

        let mut cmd = Command::new(&program);
        cmd.current_dir(&workdir).stdin(Stdio::null());

        let description = format!("deploy {}", program.display());
        match run_with_timeout(cmd, self.timeout, &description).await {
            Ok(output) => Ok(DeployStatus {
                exit_code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Err(SubprocessError::TimedOut { timeout, .. }) => Err(DeployError::TimedOut(timeout)),
            Err(e @ SubprocessError::Io { .. }) => Err(DeployError::Spawn(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
