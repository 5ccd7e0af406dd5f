// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake git adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{GitAdapter, SyncError};
use async_trait::async_trait;
use dq_core::DeployBranch;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCall {
    pub workdir: PathBuf,
    pub remote: String,
    pub branch: String,
}

struct FakeGitState {
    calls: Vec<SyncCall>,
    head: String,
    failure: Option<String>,
}

/// Fake git adapter: records syncs and reports a configurable head
#[derive(Clone)]
pub struct FakeGitAdapter {
    inner: Arc<Mutex<FakeGitState>>,
}

impl Default for FakeGitAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeGitState {
                calls: Vec::new(),
                head: "0000000000000000000000000000000000000000".to_string(),
                failure: None,
            })),
        }
    }
}

impl FakeGitAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit reported by subsequent syncs
    pub fn set_head(&self, head: impl Into<String>) {
        self.inner.lock().head = head.into();
    }

    /// Make subsequent syncs fail with `stderr`
    pub fn fail_with(&self, stderr: impl Into<String>) {
        self.inner.lock().failure = Some(stderr.into());
    }

    /// Get all recorded syncs
    pub fn calls(&self) -> Vec<SyncCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl GitAdapter for FakeGitAdapter {
    async fn sync(
        &self,
        workdir: &Path,
        remote: &str,
        branch: &DeployBranch,
    ) -> Result<String, SyncError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SyncCall {
            workdir: workdir.to_path_buf(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        match &inner.failure {
            Some(stderr) => Err(SyncError::Failed {
                command: "git fetch".to_string(),
                status: "exit status: 128".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(inner.head.clone()),
        }
    }
}
