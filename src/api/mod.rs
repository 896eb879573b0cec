// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        DailyViews, GlobalStats, HeartbeatRequest, MonthlyViews, OkResponse, PageviewRequest,
        PeriodReclaims, RecentReclaim, ReclaimHistoryEntry, ReclaimReport, SocialClickRequest,
        TotpCodeRequest, VerifyRequest,
    },
    state::AppState,
};

pub mod admin;
pub mod analytics;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod rpc;
pub mod stats;
pub mod totp;

/// Request bodies larger than this are rejected with 413.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

pub fn router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.cors_origin);
    let limited = || from_fn_with_state(state.clone(), middleware::general_rate_limit);

    let api_routes = Router::new()
        .route(
            "/stats",
            get(stats::get_stats).merge(post(stats::record_reclaim).route_layer(limited())),
        )
        .route("/stats/recent", get(stats::get_recent))
        .route(
            "/analytics/heartbeat",
            post(analytics::heartbeat).route_layer(limited()),
        )
        .route(
            "/analytics/pageview",
            post(analytics::pageview).route_layer(limited()),
        )
        .route(
            "/analytics/social",
            post(analytics::social_click).route_layer(limited()),
        )
        .route("/rpc", post(rpc::proxy).route_layer(limited()))
        .route("/admin/verify", post(admin::verify))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/reclaims", get(admin::reclaims))
        .route("/admin/visitors", get(admin::visitors))
        .route("/admin/chart", get(admin::chart))
        .route("/admin/totp/status", get(totp::status))
        .route("/admin/totp/setup", post(totp::setup))
        .route("/admin/totp/confirm", post(totp::confirm))
        .route("/admin/totp/disable", delete(totp::disable));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(from_fn(middleware::preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(middleware::X_REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(
            middleware::X_REQUEST_ID.clone(),
            middleware::UuidRequestId,
        ))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        stats::get_stats,
        stats::record_reclaim,
        stats::get_recent,
        analytics::heartbeat,
        analytics::pageview,
        analytics::social_click,
        rpc::proxy,
        admin::verify,
        admin::dashboard,
        admin::reclaims,
        admin::visitors,
        admin::chart,
        totp::status,
        totp::setup,
        totp::confirm,
        totp::disable
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            GlobalStats,
            PeriodReclaims,
            RecentReclaim,
            ReclaimHistoryEntry,
            ReclaimReport,
            DailyViews,
            MonthlyViews,
            HeartbeatRequest,
            PageviewRequest,
            SocialClickRequest,
            VerifyRequest,
            TotpCodeRequest,
            OkResponse,
            admin::DashboardResponse,
            admin::DayReclaims,
            admin::ReclaimPage,
            admin::VisitorsResponse,
            admin::ChartPoint,
            totp::TotpStatusResponse,
            totp::TotpSetupResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Stats", description = "Public reclaim statistics"),
        (name = "Analytics", description = "Anonymous usage counters"),
        (name = "RPC", description = "Allow-listed Solana JSON-RPC proxy"),
        (name = "Admin", description = "Admin dashboard, bearer token plus optional TOTP"),
        (name = "TOTP", description = "Second-factor enrollment")
    )
)]
pub struct ApiDoc;
