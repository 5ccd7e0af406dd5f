// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The branch whose pushes trigger deploys

use thiserror::Error;

const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid deploy branch {0:?}")]
pub struct InvalidBranch(pub String);

/// Deploy branch name (without the `refs/heads/` prefix)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployBranch(String);

impl DeployBranch {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidBranch> {
        let name = name.into();
        if is_valid_branch(&name) {
            Ok(Self(name))
        } else {
            Err(InvalidBranch(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full ref a push to this branch reports, e.g. `refs/heads/main`.
    pub fn ref_name(&self) -> String {
        format!("{HEADS_PREFIX}{}", self.0)
    }

    /// Exact comparison against a pushed ref. Tags and other branches never match.
    pub fn matches_ref(&self, pushed: &str) -> bool {
        pushed
            .strip_prefix(HEADS_PREFIX)
            .is_some_and(|name| name == self.0)
    }
}

impl Default for DeployBranch {
    fn default() -> Self {
        Self(crate::DEFAULT_BRANCH.to_string())
    }
}

impl std::fmt::Display for DeployBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subset of `git check-ref-format --branch` rules that matter when the
/// name is passed to git as an argument.
fn is_valid_branch(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("//")
        && !name.contains("@{")
        && !name
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || "~^:?*[\\".contains(c))
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
