// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token parsing and comparison.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use sha2::{Digest, Sha256};

use super::AuthError;

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Timing-safe token equality.
///
/// Both sides are hashed first so the comparison always runs over two
/// 32-byte digests whatever the input lengths; the digest difference is
/// accumulated over every byte and combined with the length check without
/// branching.
pub fn tokens_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());

    let diff = a
        .iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    let same_len = provided.len() == expected.len();

    (diff == 0) & same_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token(&headers("Bearer s3cret")).unwrap(), "s3cret");
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
        assert!(matches!(
            bearer_token(&headers("Basic abc")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            bearer_token(&headers("Bearer ")),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn compares_whole_tokens() {
        let expected = "admin-token-0123456789";
        assert!(tokens_match(expected, expected));
        // First byte and last byte differences are both rejected.
        assert!(!tokens_match("Xdmin-token-0123456789", expected));
        assert!(!tokens_match("admin-token-012345678X", expected));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let expected = "admin-token";
        assert!(!tokens_match("admin-toke", expected));
        assert!(!tokens_match("admin-token-", expected));
        assert!(!tokens_match("", expected));
    }
}
