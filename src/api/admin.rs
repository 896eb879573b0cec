// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for the stats dashboard.
//!
//! `POST /api/admin/verify` runs the full authentication handshake (lockout,
//! rate limit, token, TOTP). Every other endpoint here only requires the
//! bearer token through [`AdminBearer`].

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::{AdminBearer, AdminGate, AuthError, ClientIp},
    clock::day_key,
    error::ApiError,
    models::{
        DailyViews, GlobalStats, MonthlyViews, OkResponse, PeriodReclaims, ReclaimHistoryEntry,
        VerifyRequest,
    },
    state::AppState,
    storage::{AnalyticsRepository, StatsRepository},
};

use super::extract::OptionalJsonBody;

/// History entries included in the dashboard snapshot.
pub const DASHBOARD_HISTORY: usize = 50;
/// Days in the dashboard's trailing series.
pub const WEEK_DAYS: u64 = 7;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_CHART_DAYS: u64 = 7;
pub const MAX_CHART_DAYS: u64 = 90;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Reclaim totals for one calendar day.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct DayReclaims {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: u64,
    pub sol: f64,
    pub accounts: u64,
}

/// Aggregated dashboard snapshot.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Sessions that sent a heartbeat in the last two minutes.
    pub active_visitors: u64,
    pub global: GlobalStats,
    pub today_views: DailyViews,
    pub today_reclaims: PeriodReclaims,
    /// Trailing seven days of reclaims, oldest first, ending today.
    pub week: Vec<DayReclaims>,
    pub week_totals: PeriodReclaims,
    pub month: PeriodReclaims,
    pub month_views: MonthlyViews,
    /// Lifetime clicks per social button.
    pub social: BTreeMap<String, u64>,
    /// Newest history entries.
    pub history: Vec<ReclaimHistoryEntry>,
}

/// Query parameters for the reclaim history.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Entries per page, 1 to 100 (default 20).
    pub limit: Option<String>,
}

/// One page of the reclaim history.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimPage {
    pub reclaims: Vec<ReclaimHistoryEntry>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorsResponse {
    pub active_visitors: u64,
}

/// Query parameters for the chart series.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ChartParams {
    /// First day (`YYYY-MM-DD`), inclusive.
    pub start: Option<String>,
    /// Last day (`YYYY-MM-DD`), inclusive. Defaults to today.
    pub end: Option<String>,
    /// Trailing days ending today when no explicit range is given (1 to 90, default 7).
    pub days: Option<String>,
}

/// One day of the chart series.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct ChartPoint {
    pub date: String,
    pub reclaims: u64,
    pub sol: f64,
    pub accounts: u64,
    pub views: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Verify admin credentials (bearer token plus optional TOTP code).
#[utoipa::path(
    post,
    path = "/api/admin/verify",
    tag = "Admin",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = OkResponse),
        (status = 401, description = "Bad token or TOTP code"),
        (status = 403, description = "TOTP code required: {\"totpRequired\": true}"),
        (status = 429, description = "Rate limited or locked out")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    OptionalJsonBody(request): OptionalJsonBody<VerifyRequest>,
) -> Result<Json<OkResponse>, AuthError> {
    AdminGate::new(&state)
        .verify(&ip, &headers, request.totp.as_deref())
        .await?;
    tracing::info!(ip = %ip, "Admin verified");
    Ok(Json(OkResponse::ok()))
}

/// Dashboard snapshot.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn dashboard(
    _admin: AdminBearer,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let kv = state.kv.as_ref();
    let stats = StatsRepository::new(kv);
    let analytics = AnalyticsRepository::new(kv);
    let today = state.clock.today();

    let (active_visitors, global, today_views, today_reclaims, month, month_views, social, history) =
        tokio::try_join!(
            analytics.active_visitors(),
            stats.global(),
            analytics.daily_views(today),
            stats.daily(today),
            stats.monthly(today),
            analytics.monthly_views(today),
            analytics.social_counts(),
            stats.history(),
        )?;

    let mut week = Vec::with_capacity(WEEK_DAYS as usize);
    let mut week_totals = PeriodReclaims::default();
    for date in trailing_days(today, WEEK_DAYS) {
        let day = stats.daily(date).await?;
        week_totals.count += day.count;
        week_totals.sol += day.sol;
        week_totals.accounts += day.accounts;
        week.push(DayReclaims {
            date: day_key(date),
            count: day.count,
            sol: day.sol,
            accounts: day.accounts,
        });
    }

    Ok(Json(DashboardResponse {
        active_visitors,
        global,
        today_views,
        today_reclaims,
        week,
        week_totals,
        month,
        month_views,
        social,
        history: history.iter().take(DASHBOARD_HISTORY).cloned().collect(),
    }))
}

/// Paginated reclaim history (newest first).
#[utoipa::path(
    get,
    path = "/api/admin/reclaims",
    tag = "Admin",
    params(PageParams),
    responses(
        (status = 200, description = "History page", body = ReclaimPage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn reclaims(
    _admin: AdminBearer,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ReclaimPage>, ApiError> {
    let page: usize = parse_number(params.page.as_deref()).unwrap_or(1).max(1);
    let limit = parse_number(params.limit.as_deref())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let history = StatsRepository::new(state.kv.as_ref()).history().await?;
    let total = history.len();
    let reclaims = history
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(ReclaimPage {
        reclaims,
        page,
        limit,
        total,
        total_pages: total.div_ceil(limit),
    }))
}

/// Exhaustive count of active visitors.
#[utoipa::path(
    get,
    path = "/api/admin/visitors",
    tag = "Admin",
    responses(
        (status = 200, description = "Active visitor count", body = VisitorsResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn visitors(
    _admin: AdminBearer,
    State(state): State<AppState>,
) -> Result<Json<VisitorsResponse>, ApiError> {
    let active_visitors = AnalyticsRepository::new(state.kv.as_ref())
        .active_visitors()
        .await?;
    Ok(Json(VisitorsResponse { active_visitors }))
}

/// Per-day series of reclaims and views, oldest first.
#[utoipa::path(
    get,
    path = "/api/admin/chart",
    tag = "Admin",
    params(ChartParams),
    responses(
        (status = 200, description = "Daily series", body = [ChartPoint]),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn chart(
    _admin: AdminBearer,
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Result<Json<Vec<ChartPoint>>, ApiError> {
    let (start, end) = chart_range(&params, state.clock.today())?;

    let kv = state.kv.as_ref();
    let stats = StatsRepository::new(kv);
    let analytics = AnalyticsRepository::new(kv);

    let mut points = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        let (reclaims, views) = tokio::try_join!(stats.daily(date), analytics.daily_views(date))?;
        points.push(ChartPoint {
            date: day_key(date),
            reclaims: reclaims.count,
            sol: reclaims.sol,
            accounts: reclaims.accounts,
            views: views.total,
        });
    }
    Ok(Json(points))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("{field} must be a YYYY-MM-DD date")))
}

/// First day of the `count`-day span ending at `last`.
fn span_start(last: NaiveDate, count: u64) -> NaiveDate {
    last.checked_sub_days(Days::new(count.saturating_sub(1)))
        .unwrap_or(last)
}

/// `count` consecutive days ending at `last`, oldest first.
fn trailing_days(last: NaiveDate, count: u64) -> Vec<NaiveDate> {
    span_start(last, count).iter_days().take(count as usize).collect()
}

/// Resolve the inclusive chart range.
///
/// Explicit `start`/`end` win over `days`. Ranges longer than
/// [`MAX_CHART_DAYS`] keep the most recent days.
fn chart_range(params: &ChartParams, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let days = parse_number::<u64>(params.days.as_deref())
        .unwrap_or(DEFAULT_CHART_DAYS)
        .clamp(1, MAX_CHART_DAYS);

    let start = params.start.as_deref().filter(|s| !s.trim().is_empty());
    let end = params.end.as_deref().filter(|s| !s.trim().is_empty());

    if start.is_none() && end.is_none() {
        return Ok((span_start(today, days), today));
    }

    let end = match end {
        Some(raw) => parse_date(raw, "end")?,
        None => today,
    };
    let start = match start {
        Some(raw) => parse_date(raw, "start")?,
        None => span_start(end, days),
    };
    if start > end {
        return Err(ApiError::bad_request("start must not be after end"));
    }

    let oldest_allowed = span_start(end, MAX_CHART_DAYS);
    Ok((start.max(oldest_allowed), end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn params(start: Option<&str>, end: Option<&str>, days: Option<&str>) -> ChartParams {
        ChartParams {
            start: start.map(String::from),
            end: end.map(String::from),
            days: days.map(String::from),
        }
    }

    #[test]
    fn trailing_days_are_oldest_first() {
        let days = trailing_days(date("2026-03-02"), 3);
        assert_eq!(days, vec![date("2026-02-28"), date("2026-03-01"), date("2026-03-02")]);
    }

    #[test]
    fn default_range_is_last_seven_days() {
        let today = date("2026-05-10");
        let (start, end) = chart_range(&ChartParams::default(), today).unwrap();
        assert_eq!((start, end), (date("2026-05-04"), today));
    }

    #[test]
    fn days_parameter_is_clamped() {
        let today = date("2026-05-10");
        let (start, _) = chart_range(&params(None, None, Some("365")), today).unwrap();
        assert_eq!((today - start).num_days(), 89);

        let (start, end) = chart_range(&params(None, None, Some("0")), today).unwrap();
        assert_eq!(start, end);

        let (start, _) = chart_range(&params(None, None, Some("junk")), today).unwrap();
        assert_eq!((today - start).num_days(), 6);
    }

    #[test]
    fn explicit_range_wins_and_is_capped() {
        let today = date("2026-05-10");
        let (start, end) =
            chart_range(&params(Some("2026-01-01"), Some("2026-01-03"), Some("30")), today).unwrap();
        assert_eq!((start, end), (date("2026-01-01"), date("2026-01-03")));

        let (start, end) =
            chart_range(&params(Some("2025-01-01"), Some("2026-01-31"), None), today).unwrap();
        assert_eq!(end, date("2026-01-31"));
        assert_eq!((end - start).num_days(), 89);
    }

    #[test]
    fn bad_ranges_are_rejected() {
        let today = date("2026-05-10");
        let err = chart_range(&params(Some("2026-02-01"), Some("2026-01-01"), None), today)
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = chart_range(&params(Some("yesterday"), None, None), today).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
