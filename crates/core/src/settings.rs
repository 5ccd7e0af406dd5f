// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Settings both processes must agree on.

use std::path::PathBuf;

use thiserror::Error;

use crate::env;
use crate::{DeployBranch, IdentityPattern};

/// Mailbox root used when `DQ_MAILBOX_ROOT` is unset
pub const DEFAULT_MAILBOX_ROOT: &str = "/app/webhook_jobs";

/// Deploy branch used when `DQ_DEPLOY_BRANCH` is unset
pub const DEFAULT_BRANCH: &str = "main";

/// Configuration errors, reported at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Mailbox location, deploy branch and identity whitelist.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mailbox_root: PathBuf,
    pub deploy_branch: DeployBranch,
    pub identity_pattern: IdentityPattern,
}

impl Settings {
    /// Read `DQ_MAILBOX_ROOT`, `DQ_DEPLOY_BRANCH` and `DQ_IDENTITY_PATTERN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mailbox_root = env::var("DQ_MAILBOX_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MAILBOX_ROOT));

        let deploy_branch = match env::var("DQ_DEPLOY_BRANCH") {
            Some(name) => DeployBranch::new(name).map_err(|e| ConfigError::Invalid {
                var: "DQ_DEPLOY_BRANCH",
                reason: e.to_string(),
            })?,
            None => DeployBranch::default(),
        };

        let identity_pattern = match env::var("DQ_IDENTITY_PATTERN") {
            Some(pattern) => {
                IdentityPattern::new(&pattern).map_err(|e| ConfigError::Invalid {
                    var: "DQ_IDENTITY_PATTERN",
                    reason: e.to_string(),
                })?
            }
            None => IdentityPattern::default(),
        };

        Ok(Self {
            mailbox_root,
            deploy_branch,
            identity_pattern,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mailbox_root: PathBuf::from(DEFAULT_MAILBOX_ROOT),
            deploy_branch: DeployBranch::default(),
            identity_pattern: IdentityPattern::default(),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
