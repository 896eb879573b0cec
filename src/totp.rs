// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # TOTP Engine
//!
//! Time-based one-time passwords (RFC 6238) on top of the HOTP construction
//! of RFC 4226, using HMAC-SHA1, a 30 second step and 6 digits so codes are
//! interchangeable with standard authenticator apps.
//!
//! Secrets are 20 random bytes, exchanged as unpadded RFC 4648 Base32.

use data_encoding::BASE32_NOPAD;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use url::Url;

/// Length of a generated secret in bytes (160 bits, the SHA1 output size).
pub const SECRET_LEN: usize = 20;
/// Code length.
pub const DIGITS: usize = 6;
/// Time step in seconds.
pub const PERIOD_SECS: i64 = 30;
/// Accepted counter drift on each side of the current step.
pub const SKEW_STEPS: i64 = 1;

const MODULUS: u32 = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("secure random source unavailable")]
    Randomness,

    #[error("invalid enrollment URI: {0}")]
    Uri(String),
}

/// Freshly generated shared secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSecret {
    pub base32: String,
    pub bytes: Vec<u8>,
}

impl GeneratedSecret {
    /// Lowercase hex of the raw secret bytes.
    pub fn hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Draw a new 20-byte secret from the system CSPRNG.
pub fn generate_secret() -> Result<GeneratedSecret, TotpError> {
    let mut bytes = vec![0u8; SECRET_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| TotpError::Randomness)?;
    Ok(GeneratedSecret {
        base32: base32_encode(&bytes),
        bytes,
    })
}

/// `otpauth://totp/<issuer>:admin?secret=..&issuer=..&digits=6&period=30`
pub fn enrollment_uri(issuer: &str, secret_base32: &str) -> Result<String, TotpError> {
    let mut uri =
        Url::parse("otpauth://totp/").map_err(|e| TotpError::Uri(e.to_string()))?;
    uri.path_segments_mut()
        .map_err(|_| TotpError::Uri("otpauth URI cannot carry a label".into()))?
        .pop_if_empty()
        .push(&format!("{issuer}:admin"));
    uri.query_pairs_mut()
        .append_pair("secret", secret_base32)
        .append_pair("issuer", issuer)
        .append_pair("digits", &DIGITS.to_string())
        .append_pair("period", &PERIOD_SECS.to_string());
    // Form encoding writes spaces as `+`; authenticator apps expect `%20`.
    // A literal `+` has already been escaped to `%2B` at this point.
    let query = uri.query().map(|q| q.replace('+', "%20"));
    uri.set_query(query.as_deref());
    Ok(uri.into())
}

/// HOTP value for one counter (RFC 4226 §5.3), zero-padded to six digits.
pub fn code(secret: &[u8], counter: u64) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, secret);
    let tag = hmac::sign(&key, &counter.to_be_bytes());
    let mac = tag.as_ref();

    // Dynamic truncation (RFC 4226 §5.4).
    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ]);

    format!("{:0width$}", binary % MODULUS, width = DIGITS)
}

/// Time step containing `now_ms`.
pub fn counter_at(now_ms: i64) -> i64 {
    now_ms.div_euclid(PERIOD_SECS * 1000)
}

/// Check a user-supplied code against the current step and its neighbours.
///
/// Anything other than exactly six ASCII digits is rejected up front, as is
/// a secret that does not decode.
pub fn verify(secret_base32: &str, user_code: &str, now_ms: i64) -> bool {
    if user_code.len() != DIGITS || !user_code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Some(secret) = base32_decode(secret_base32) else {
        return false;
    };
    if secret.is_empty() {
        return false;
    }

    let current = counter_at(now_ms);
    ((current - SKEW_STEPS)..=(current + SKEW_STEPS))
        .filter(|c| *c >= 0)
        .any(|c| code(&secret, c as u64) == user_code)
}

// =============================================================================
// Base32 (RFC 4648, no padding)
// =============================================================================

pub fn base32_encode(data: &[u8]) -> String {
    BASE32_NOPAD.encode(data)
}

/// Decode Base32, ignoring case, whitespace, dashes and trailing `=`.
pub fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    BASE32_NOPAD.decode(normalized.as_bytes()).ok()
}
