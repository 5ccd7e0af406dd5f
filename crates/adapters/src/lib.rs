// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: git and the per-project deploy procedure

pub mod deploy;
pub mod git;
pub mod subprocess;
pub mod traced;

pub use deploy::{DeployAdapter, DeployError, DeployStatus, ScriptDeployAdapter};
pub use git::{GitAdapter, GitCliAdapter, SyncError};
pub use subprocess::SubprocessError;
pub use traced::{TracedDeploy, TracedGit};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use deploy::{DeployCall, FakeDeployAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use git::{FakeGitAdapter, SyncCall};
