// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project deploy procedure invocation

mod script;

pub use script::ScriptDeployAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeployCall, FakeDeployAdapter};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that prevented the procedure from producing an exit status
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deploy entry point {} does not exist", .0.display())]
    MissingEntryPoint(PathBuf),
    #[error("deploy entry point {} is not an executable file", .0.display())]
    NotExecutable(PathBuf),
    #[error("failed to start deploy procedure: {0}")]
    Spawn(String),
    #[error("deploy procedure timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Result of a procedure run that exited on its own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployStatus {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl DeployStatus {
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Adapter that runs a project's deploy entry point
#[async_trait]
pub trait DeployAdapter: Clone + Send + Sync + 'static {
    /// Run `entry_point` (relative to `workdir`) with `workdir` as its
    /// current directory. A non-zero exit is a status, not an error.
    async fn run(&self, workdir: &Path, entry_point: &Path) -> Result<DeployStatus, DeployError>;
}
