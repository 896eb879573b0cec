// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public reclaim statistics.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{GlobalStats, OkResponse, RecentReclaim, ReclaimReport},
    state::AppState,
    storage::{NewReclaim, StatsRepository},
};

use super::extract::JsonBody;

/// Lifetime totals across all wallets.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Global totals", body = GlobalStats),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, ApiError> {
    let repo = StatsRepository::new(state.kv.as_ref());
    Ok(Json(repo.global().await?))
}

/// Report a completed rent reclaim.
#[utoipa::path(
    post,
    path = "/api/stats",
    tag = "Stats",
    request_body = ReclaimReport,
    responses(
        (status = 200, description = "Reclaim recorded", body = OkResponse),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn record_reclaim(
    State(state): State<AppState>,
    JsonBody(report): JsonBody<ReclaimReport>,
) -> Result<Json<OkResponse>, ApiError> {
    let reclaim = NewReclaim::validate(report).map_err(ApiError::bad_request)?;

    let repo = StatsRepository::new(state.kv.as_ref());
    let outcome = repo.record_reclaim(&reclaim, state.clock.now_ms()).await?;

    tracing::info!(
        wallet = %reclaim.wallet.shortened(),
        accounts = reclaim.accounts,
        new_wallet = outcome.new_wallet,
        "Reclaim reported"
    );

    Ok(Json(OkResponse::ok()))
}

/// Most recent reclaims (public-safe, newest first).
#[utoipa::path(
    get,
    path = "/api/stats/recent",
    tag = "Stats",
    responses(
        (status = 200, description = "Up to 10 recent reclaims", body = [RecentReclaim])
    )
)]
pub async fn get_recent(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecentReclaim>>, ApiError> {
    let repo = StatsRepository::new(state.kv.as_ref());
    Ok(Json(repo.recent().await?))
}
