// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable helpers shared by the ingress and the watcher.

use std::str::FromStr;
use std::time::Duration;

use crate::settings::ConfigError;

/// Value of `name`, trimmed; unset and blank are both `None`.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `name` with `FromStr`, reporting the variable on failure.
pub fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: name,
                reason: format!("{raw:?}: {e}"),
            }),
    }
}

/// Whole seconds, rejecting zero.
pub fn secs_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match parse_var::<u64>(name)? {
        Some(0) => Err(ConfigError::Invalid {
            var: name,
            reason: "must be at least 1 second".to_string(),
        }),
        other => Ok(other.map(Duration::from_secs)),
    }
}
