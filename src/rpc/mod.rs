// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # RPC Proxy
//!
//! Forwards JSON-RPC traffic from the browser tools to the private Solana
//! RPC provider, so the provider URL (and its API key) never reaches the
//! client.
//!
//! Every request object is checked against [`methods::ALLOWED_METHODS`]
//! before anything is sent upstream. A batch with a single disallowed
//! method is rejected as a whole. Accepted bodies are forwarded byte for
//! byte and the upstream status and body come back unchanged.

pub mod body;
pub mod methods;
pub mod proxy;

pub use body::RpcBody;
pub use methods::is_allowed;
pub use proxy::{RpcProxy, UpstreamResponse};

use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Empty batch")]
    EmptyBatch,

    #[error("Invalid JSON-RPC request")]
    InvalidRequest,

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("RPC upstream not configured")]
    NotConfigured,

    #[error("Upstream RPC request timed out")]
    Timeout,

    #[error("Upstream RPC request failed: {0}")]
    Upstream(String),

    #[error("HTTP client build failed: {0}")]
    Client(String),
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        use axum::http::StatusCode;

        let status = match &err {
            RpcError::InvalidJson | RpcError::EmptyBatch | RpcError::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            RpcError::MethodNotAllowed(_) => StatusCode::FORBIDDEN,
            RpcError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            RpcError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            RpcError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RpcError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &err {
            // Network details stay in the log.
            RpcError::Upstream(_) => "Upstream RPC request failed".to_string(),
            other => other.to_string(),
        };
        ApiError::new(status, message)
    }
}
