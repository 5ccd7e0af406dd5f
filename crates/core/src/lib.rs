// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dq-core: identities and settings shared by the ingress and the watcher

pub mod branch;
pub mod env;
pub mod project;
pub mod settings;

pub use branch::{DeployBranch, InvalidBranch};
pub use project::{IdentityPattern, InvalidProjectId, ProjectId};
pub use settings::{ConfigError, Settings, DEFAULT_BRANCH, DEFAULT_MAILBOX_ROOT};
