// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Client IP resolution.
//!
//! The service runs behind an edge proxy, so the socket peer is never the
//! client. The IP comes from the configured trusted header, then the first
//! `x-forwarded-for` hop, then the literal `"unknown"` (which makes every
//! header-less caller share one rate-limit and lockout bucket).

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::state::AppState;

pub const UNKNOWN_IP: &str = "unknown";

pub fn resolve_client_ip(headers: &HeaderMap, trusted_header: &str) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(ip) = header_value(trusted_header) {
        return ip.to_string();
    }

    header_value("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_IP)
        .to_string()
}

/// Extractor yielding the resolved client IP.
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(resolve_client_ip(
            &parts.headers,
            &state.config.client_ip_header,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_trusted_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(resolve_client_ip(&headers, "cf-connecting-ip"), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 198.51.100.4 , 10.0.0.1"),
        );
        assert_eq!(resolve_client_ip(&headers, "cf-connecting-ip"), "198.51.100.4");
    }

    #[test]
    fn unknown_without_headers() {
        assert_eq!(resolve_client_ip(&HeaderMap::new(), "cf-connecting-ip"), UNKNOWN_IP);
    }
}
