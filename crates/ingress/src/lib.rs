// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dq ingress
//!
//! Stateless HTTP service that authenticates push notifications and marks
//! the pushed project pending in the mailbox. It never runs a deploy.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
mod env;
pub mod error;
pub mod payload;
pub mod router;
pub mod signature;
pub mod webhook;

pub use config::{IngressConfig, WebhookSecret};
pub use error::IngressError;
pub use router::{router, AppState};
pub use signature::{sign, verify, SignatureError, SIGNATURE_PREFIX};
pub use webhook::{IgnoreReason, WebhookOutcome, EVENT_HEADER, SIGNATURE_HEADER};
