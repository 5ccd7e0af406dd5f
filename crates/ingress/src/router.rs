// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP routes

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use dq_storage::Mailbox;
use serde_json::{json, Value};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::webhook;
use crate::IngressConfig;

/// Shared, read-only handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<IngressConfig>,
    pub mailbox: Mailbox,
}

impl AppState {
    pub fn new(config: IngressConfig) -> Self {
        let mailbox = Mailbox::new(config.settings.mailbox_root.clone())
            .with_pattern(config.settings.identity_pattern.clone());
        Self {
            config: Arc::new(config),
            mailbox,
        }
    }
}

/// Build the router.
///
/// Request tracing is attached to the webhook route only; `/health`
/// (GET and HEAD) stays out of the request log.
pub fn router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route("/webhook/github", post(webhook::github_webhook))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Router::new()
        .merge(webhook_routes)
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
