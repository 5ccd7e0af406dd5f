// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the ingress crate.

use std::net::SocketAddr;

use dq_core::env::parse_var;
use dq_core::ConfigError;

/// Listen address when `DQ_BIND_ADDR` is unset
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Body limit when `DQ_MAX_BODY_BYTES` is unset (GitHub caps payloads at 25 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// `GITHUB_WEBHOOK_SECRET`, stripped of surrounding quotes and whitespace.
pub fn webhook_secret() -> Result<String, ConfigError> {
    let raw = std::env::var("GITHUB_WEBHOOK_SECRET").unwrap_or_default();
    let secret = raw.trim_matches(|c| matches!(c, '\'' | '"' | ' ' | '\t' | '\n' | '\r'));
    if secret.is_empty() {
        return Err(ConfigError::Missing("GITHUB_WEBHOOK_SECRET"));
    }
    Ok(secret.to_string())
}

pub fn bind_addr() -> Result<SocketAddr, ConfigError> {
    match parse_var::<SocketAddr>("DQ_BIND_ADDR")? {
        Some(addr) => Ok(addr),
        None => DEFAULT_BIND_ADDR
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "DQ_BIND_ADDR",
                reason: e.to_string(),
            }),
    }
}

pub fn max_body_bytes() -> Result<usize, ConfigError> {
    Ok(parse_var::<usize>("DQ_MAX_BODY_BYTES")?.unwrap_or(DEFAULT_MAX_BODY_BYTES))
}
