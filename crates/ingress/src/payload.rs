// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parts of a push event payload the ingress reads

use serde::Deserialize;

/// Push event body. Everything besides `ref` and `repository.name` is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub name: Option<String>,
}

impl PushPayload {
    /// Parse a push body. Anything but a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("push payload is not a JSON object"));
        }
        Self::deserialize(value)
    }

    /// Pushed ref, or `""` when absent.
    pub fn git_ref(&self) -> &str {
        self.git_ref.as_deref().unwrap_or_default()
    }

    /// Repository name, or `""` when absent.
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
