// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, state::AppState};

/// Forward a single or batch JSON-RPC request to the private Solana RPC.
///
/// The upstream status and body are returned unchanged.
#[utoipa::path(
    post,
    path = "/api/rpc",
    tag = "RPC",
    request_body(content = serde_json::Value, description = "JSON-RPC request object or batch array"),
    responses(
        (status = 200, description = "Upstream response, passed through"),
        (status = 400, description = "Malformed JSON-RPC body"),
        (status = 403, description = "Method not allowed"),
        (status = 429, description = "Rate limited"),
        (status = 502, description = "Upstream unreachable"),
        (status = 503, description = "No upstream configured")
    )
)]
pub async fn proxy(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let upstream = state.rpc.forward(body).await.map_err(|err| {
        tracing::debug!(error = %err, "RPC request rejected");
        ApiError::from(err)
    })?;

    let mut response = (upstream.status, Body::from(upstream.body)).into_response();
    if let Some(content_type) = upstream.content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
