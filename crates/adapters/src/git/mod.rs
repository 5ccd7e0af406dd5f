// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Working copy synchronization

mod cli;

pub use cli::GitCliAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGitAdapter, SyncCall};

use async_trait::async_trait;
use dq_core::DeployBranch;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::SubprocessError;

/// Errors from working copy sync
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("working copy {} does not exist", .0.display())]
    MissingWorkingCopy(PathBuf),
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Adapter that brings a working copy to the tip of a remote branch
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Fetch `branch` from `remote` and hard-reset `workdir` to it,
    /// discarding local changes. Returns the new `HEAD` commit.
    async fn sync(
        &self,
        workdir: &Path,
        remote: &str,
        branch: &DeployBranch,
    ) -> Result<String, SyncError>;
}
