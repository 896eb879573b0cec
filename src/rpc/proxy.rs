// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upstream forwarding.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use reqwest::Client;

use super::{RpcBody, RpcError};

/// Raw upstream reply, passed back to the caller unchanged.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Validating forwarder to the private RPC provider.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct RpcProxy {
    client: Client,
    upstream: Option<Arc<str>>,
}

impl RpcProxy {
    pub fn new(upstream: Option<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to build RPC http client");
                RpcError::Client(e.to_string())
            })?;

        Ok(Self {
            client,
            upstream: upstream.map(Arc::from),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }

    /// Validate `raw` against the allow-list and forward it verbatim.
    ///
    /// No retries: a retried `sendTransaction` could submit twice.
    pub async fn forward(&self, raw: Bytes) -> Result<UpstreamResponse, RpcError> {
        let calls = RpcBody::parse(&raw)?.validate()?;

        let upstream = self.upstream.as_deref().ok_or(RpcError::NotConfigured)?;

        let response = self
            .client
            .post(upstream)
            .header(CONTENT_TYPE, "application/json")
            .body(raw)
            .send()
            .await
            .map_err(|e| upstream_error(&e))?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|e| upstream_error(&e))?;

        tracing::debug!(calls, status = status.as_u16(), "Forwarded RPC request");

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

fn upstream_error(error: &reqwest::Error) -> RpcError {
    if error.is_timeout() {
        tracing::warn!("Upstream RPC request timed out");
        return RpcError::Timeout;
    }

    let reason = if error.is_connect() {
        "connection refused or unreachable"
    } else if error.is_body() || error.is_decode() {
        "response body error"
    } else {
        "network error"
    };
    tracing::warn!(error = %error, reason, "Upstream RPC request failed");
    RpcError::Upstream(reason.to_string())
}
