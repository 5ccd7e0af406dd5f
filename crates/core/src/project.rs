// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project identities.
//!
//! A [`ProjectId`] is the only thing that travels from the ingress to the
//! watcher. It names a queue slot, a lock file and a working copy, so every
//! value must be usable as a single path component. The configurable
//! [`IdentityPattern`] narrows that further.

use regex::Regex;
use thiserror::Error;

/// Identity rejected by the pattern or the path-safety check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProjectId {
    #[error("project identity is empty")]
    Empty,
    #[error("project identity {0:?} is not a safe path component")]
    UnsafePath(String),
    #[error("project identity {id:?} does not match {pattern}")]
    PatternMismatch { id: String, pattern: String },
}

/// Validated project identity.
///
/// Only constructible through [`IdentityPattern::parse`] (or
/// [`ProjectId::parse`] for the default pattern).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    /// Parse with the default identity pattern.
    pub fn parse(raw: &str) -> Result<Self, InvalidProjectId> {
        IdentityPattern::default().parse(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProjectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProjectId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for ProjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Whitelist pattern for project identities.
///
/// The pattern always has to match the whole identity; it is anchored on
/// construction, so `[a-z]+` and `^[a-z]+$` behave the same.
#[derive(Debug, Clone)]
pub struct IdentityPattern {
    source: String,
    regex: Regex,
}

impl IdentityPattern {
    /// Letters, digits, `_` and `-`.
    pub const DEFAULT: &'static str = r"^[a-zA-Z0-9_-]+$";

    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let inner = pattern.strip_prefix('^').unwrap_or(pattern);
        let inner = inner.strip_suffix('$').unwrap_or(inner);
        let regex = Regex::new(&format!("^(?:{inner})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, raw: &str) -> bool {
        self.parse(raw).is_ok()
    }

    /// Validate `raw` and wrap it as a [`ProjectId`].
    pub fn parse(&self, raw: &str) -> Result<ProjectId, InvalidProjectId> {
        if raw.is_empty() {
            return Err(InvalidProjectId::Empty);
        }
        if !is_path_safe(raw) {
            return Err(InvalidProjectId::UnsafePath(raw.to_string()));
        }
        if !self.regex.is_match(raw) {
            return Err(InvalidProjectId::PatternMismatch {
                id: raw.to_string(),
                pattern: self.source.clone(),
            });
        }
        Ok(ProjectId(raw.to_string()))
    }
}

impl Default for IdentityPattern {
    fn default() -> Self {
        // The default pattern is a literal known to compile.
        #[allow(clippy::expect_used)]
        Self::new(Self::DEFAULT).expect("default identity pattern compiles")
    }
}

impl std::fmt::Display for IdentityPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Hidden names are reserved for mailbox tombstones.
fn is_path_safe(raw: &str) -> bool {
    !raw.starts_with('.')
        && !raw.contains('/')
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control)
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
