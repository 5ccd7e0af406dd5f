// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `X-Hub-Signature-256` verification.
//!
//! The header carries `sha256=<hex HMAC-SHA256 of the raw body>`. The
//! comparison is constant-time so response timing does not reveal how much
//! of a forged signature was right.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Algorithm prefix of the signature header value
pub const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing or invalid signature")]
    Missing,
    #[error("signature mismatch")]
    Mismatch,
    #[error("invalid signing key")]
    Key,
}

/// Header value GitHub would send for `body` signed with `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Key)?;
    mac.update(body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Check `header` (the raw signature header, if present) against `body`.
pub fn verify(secret: &[u8], body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let received = header
        .and_then(|h| h.strip_prefix(SIGNATURE_PREFIX))
        .filter(|hex| !hex.is_empty())
        .ok_or(SignatureError::Missing)?;

    let expected = sign(secret, body)?;
    let expected = &expected[SIGNATURE_PREFIX.len()..];

    if bool::from(expected.as_bytes().ct_eq(received.as_bytes())) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
