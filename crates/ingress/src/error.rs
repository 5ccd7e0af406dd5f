// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request failures and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dq_storage::MailboxError;
use serde_json::json;
use thiserror::Error;

use crate::SignatureError;

/// Reasons a webhook request is rejected. Ignored events are not errors.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error(transparent)]
    Unauthorized(#[from] SignatureError),

    #[error("{0}")]
    BadRequest(String),

    #[error("failed to queue deploy: {0}")]
    Enqueue(#[from] MailboxError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IngressError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Enqueue(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller; storage paths stay in the log.
    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(e) => e.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Enqueue(_) => "failed to queue deploy".to_string(),
            Self::Internal(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
