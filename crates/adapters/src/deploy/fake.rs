// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake deploy adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DeployAdapter, DeployError, DeployStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Recorded deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCall {
    pub workdir: PathBuf,
    pub entry_point: PathBuf,
}

#[derive(Clone)]
enum Scripted {
    Exit(i32),
    TimedOut,
    Missing,
}

struct FakeDeployState {
    calls: Vec<DeployCall>,
    outcome: Scripted,
    delay: Option<Duration>,
    running: usize,
    max_running: usize,
}

/// Fake deploy adapter: records runs, reports a scripted outcome
#[derive(Clone)]
pub struct FakeDeployAdapter {
    inner: Arc<Mutex<FakeDeployState>>,
}

impl Default for FakeDeployAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeDeployState {
                calls: Vec::new(),
                outcome: Scripted::Exit(0),
                delay: None,
                running: 0,
                max_running: 0,
            })),
        }
    }
}

impl FakeDeployAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit code reported by subsequent runs
    pub fn set_exit_code(&self, code: i32) {
        self.inner.lock().outcome = Scripted::Exit(code);
    }

    /// Subsequent runs report a timeout
    pub fn set_timed_out(&self) {
        self.inner.lock().outcome = Scripted::TimedOut;
    }

    /// Subsequent runs report a missing entry point
    pub fn set_missing(&self) {
        self.inner.lock().outcome = Scripted::Missing;
    }

    /// Each run sleeps this long before returning
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }

    /// Get all recorded runs
    pub fn calls(&self) -> Vec<DeployCall> {
        self.inner.lock().calls.clone()
    }

    /// Runs currently in progress
    pub fn running(&self) -> usize {
        self.inner.lock().running
    }

    /// Highest number of runs that were in progress at once
    pub fn max_running(&self) -> usize {
        self.inner.lock().max_running
    }
}

#[async_trait]
impl DeployAdapter for FakeDeployAdapter {
    async fn run(&self, workdir: &Path, entry_point: &Path) -> Result<DeployStatus, DeployError> {
        let (outcome, delay) = {
            let mut inner = self.inner.lock();
            inner.calls.push(DeployCall {
                workdir: workdir.to_path_buf(),
                entry_point: entry_point.to_path_buf(),
            });
            inner.running += 1;
            inner.max_running = inner.max_running.max(inner.running);
            (inner.outcome.clone(), inner.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.inner.lock().running -= 1;
        match outcome {
            Scripted::Exit(code) => Ok(DeployStatus::exited(code)),
            Scripted::TimedOut => Err(DeployError::TimedOut(Duration::from_secs(1800))),
            Scripted::Missing => Err(DeployError::MissingEntryPoint(workdir.join(entry_point))),
        }
    }
}
