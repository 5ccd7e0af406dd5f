// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingress configuration, loaded once at startup

use std::net::SocketAddr;

use dq_core::{ConfigError, Settings};

use crate::env;

/// Pre-shared HMAC key. Never printed.
#[derive(Clone)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

/// Everything the request handlers need; immutable after startup
#[derive(Debug, Clone)]
pub struct IngressConfig {
    pub settings: Settings,
    pub secret: WebhookSecret,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl IngressConfig {
    /// Load from the environment. Fails if the webhook secret is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            settings: Settings::from_env()?,
            secret: WebhookSecret::new(env::webhook_secret()?),
            bind_addr: env::bind_addr()?,
            max_body_bytes: env::max_body_bytes()?,
        })
    }

    /// Config with default settings and the given secret.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self {
            settings: Settings::default(),
            secret: WebhookSecret::new(secret),
            bind_addr: env::DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    var: "DQ_BIND_ADDR",
                    reason: e.to_string(),
                })?,
            max_body_bytes: env::DEFAULT_MAX_BODY_BYTES,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
