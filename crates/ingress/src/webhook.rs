// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /webhook/github`
//!
//! Checks run in a fixed order: signature, event type, JSON, ref, identity.
//! Only the signature and an unreadable body are errors; everything else
//! that is not a deployable push is answered with `ok: true` and the reason
//! it was ignored.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dq_core::ProjectId;
use serde_json::json;
use tracing::{error, info, warn};

use crate::payload::PushPayload;
use crate::router::AppState;
use crate::{signature, IngressError};

/// Header carrying `sha256=<hex>`
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Header naming the event type
pub const EVENT_HEADER: &str = "x-github-event";

/// Event type that may trigger a deploy
const PUSH_EVENT: &str = "push";

/// Why a well-signed request did not queue anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NotPush,
    /// Carries the configured deploy branch
    WrongRef(String),
    InvalidRepository,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPush => f.write_str("not a push"),
            Self::WrongRef(branch) => write!(f, "not {branch}"),
            Self::InvalidRepository => f.write_str("invalid repository"),
        }
    }
}

/// Successful (200) answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Queued(ProjectId),
    Ignored(IgnoreReason),
}

impl IntoResponse for WebhookOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Queued(_) => Json(json!({ "ok": true, "queued": true })).into_response(),
            Self::Ignored(reason) => {
                Json(json!({ "ok": true, "ignored": reason.to_string() })).into_response()
            }
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<WebhookOutcome, IngressError> {
    let sig = header(&headers, SIGNATURE_HEADER);
    if let Err(e) = signature::verify(state.config.secret.as_bytes(), &body, sig) {
        warn!(
            error = %e,
            sig_present = sig.is_some_and(|s| !s.is_empty()),
            body_len = body.len(),
            "signature verification failed"
        );
        return Err(e.into());
    }

    let event = header(&headers, EVENT_HEADER).unwrap_or_default();
    if event != PUSH_EVENT {
        info!(event, "ignored event type");
        return Ok(WebhookOutcome::Ignored(IgnoreReason::NotPush));
    }

    let payload = PushPayload::from_slice(&body).map_err(|e| {
        warn!(error = %e, "invalid JSON");
        IngressError::BadRequest("invalid JSON".to_string())
    })?;

    let settings = &state.config.settings;
    if !settings.deploy_branch.matches_ref(payload.git_ref()) {
        info!(
            git_ref = payload.git_ref(),
            repository = payload.repository_name(),
            "ignored ref"
        );
        return Ok(WebhookOutcome::Ignored(IgnoreReason::WrongRef(
            settings.deploy_branch.to_string(),
        )));
    }

    let project = match settings.identity_pattern.parse(payload.repository_name()) {
        Ok(project) => project,
        Err(e) => {
            info!(error = %e, "ignored invalid or empty repository name");
            return Ok(WebhookOutcome::Ignored(IgnoreReason::InvalidRepository));
        }
    };

    let mailbox = state.mailbox.clone();
    let slot = project.clone();
    tokio::task::spawn_blocking(move || mailbox.mark_pending(&slot))
        .await
        .map_err(|e| IngressError::Internal(e.to_string()))?
        .map_err(|e| {
            error!(project = %project, error = %e, "failed to queue deploy");
            IngressError::Enqueue(e)
        })?;

    info!(project = %project, "deploy queued");
    Ok(WebhookOutcome::Queued(project))
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
