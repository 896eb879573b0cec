// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anonymous analytics ingestion.

use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    error::ApiError,
    models::{HeartbeatRequest, OkResponse, PageviewRequest, SocialClickRequest},
    state::AppState,
    storage::AnalyticsRepository,
};

use super::extract::{JsonBody, OptionalJsonBody};

/// Mark a browser session as active for two minutes.
#[utoipa::path(
    post,
    path = "/api/analytics/heartbeat",
    tag = "Analytics",
    request_body = HeartbeatRequest,
    responses(
        (status = 200, description = "Presence refreshed", body = OkResponse),
        (status = 400, description = "Missing or oversized sessionId")
    )
)]
pub async fn heartbeat(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<HeartbeatRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let session_id = request.session_id.unwrap_or_default();
    let repo = AnalyticsRepository::new(state.kv.as_ref());
    if !repo.heartbeat(&session_id).await? {
        return Err(ApiError::bad_request("Invalid sessionId"));
    }
    Ok(Json(OkResponse::ok()))
}

/// Count a page view, partitioned by page and edge-provided country.
#[utoipa::path(
    post,
    path = "/api/analytics/pageview",
    tag = "Analytics",
    request_body = PageviewRequest,
    responses(
        (status = 200, description = "View counted", body = OkResponse)
    )
)]
pub async fn pageview(
    State(state): State<AppState>,
    headers: HeaderMap,
    OptionalJsonBody(request): OptionalJsonBody<PageviewRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let country = headers
        .get(state.config.country_header.as_str())
        .and_then(|v| v.to_str().ok());

    let repo = AnalyticsRepository::new(state.kv.as_ref());
    repo.pageview(request.page.as_deref(), country, state.clock.today())
        .await?;
    Ok(Json(OkResponse::ok()))
}

/// Count a click on one of the allow-listed social buttons.
#[utoipa::path(
    post,
    path = "/api/analytics/social",
    tag = "Analytics",
    request_body = SocialClickRequest,
    responses(
        (status = 200, description = "Click counted", body = OkResponse),
        (status = 400, description = "Unknown button")
    )
)]
pub async fn social_click(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SocialClickRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let button = request.button.unwrap_or_default();
    let repo = AnalyticsRepository::new(state.kv.as_ref());
    if !repo.social_click(&button).await? {
        return Err(ApiError::bad_request("Invalid button"));
    }
    Ok(Json(OkResponse::ok()))
}
