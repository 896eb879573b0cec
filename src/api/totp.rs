// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TOTP enrollment endpoints.
//!
//! Enrollment is two-phase: `setup` parks a fresh secret under
//! `admin:totp:pending` for ten minutes, `confirm` proves the authenticator
//! app produces matching codes and promotes it. A wrong code on `confirm`
//! or `disable` counts against the caller's lockout like a bad token.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{AdminBearer, AdminGate, AuthError},
    error::ApiError,
    models::{OkResponse, TotpCodeRequest},
    state::AppState,
    storage::TotpRepository,
    totp,
};

use super::extract::JsonBody;

#[derive(Debug, Serialize, ToSchema)]
pub struct TotpStatusResponse {
    pub enabled: bool,
}

/// Material for enrolling an authenticator app.
#[derive(Debug, Serialize, ToSchema)]
pub struct TotpSetupResponse {
    /// Base32 secret for manual entry.
    pub secret: String,
    /// `otpauth://` URI for QR codes.
    pub uri: String,
    /// Hex of the raw 20-byte secret.
    pub raw: String,
}

/// Errors from the enrollment flow: request problems or code failures.
#[derive(Debug)]
pub enum TotpFlowError {
    Api(ApiError),
    Auth(AuthError),
}

impl From<ApiError> for TotpFlowError {
    fn from(err: ApiError) -> Self {
        TotpFlowError::Api(err)
    }
}

impl From<AuthError> for TotpFlowError {
    fn from(err: AuthError) -> Self {
        TotpFlowError::Auth(err)
    }
}

impl From<crate::storage::StoreError> for TotpFlowError {
    fn from(err: crate::storage::StoreError) -> Self {
        TotpFlowError::Api(err.into())
    }
}

impl IntoResponse for TotpFlowError {
    fn into_response(self) -> Response {
        match self {
            TotpFlowError::Api(err) => err.into_response(),
            TotpFlowError::Auth(err) => err.into_response(),
        }
    }
}

fn required_code(request: &TotpCodeRequest) -> Result<&str, ApiError> {
    request
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("code is required"))
}

/// Whether the second factor is enabled.
#[utoipa::path(
    get,
    path = "/api/admin/totp/status",
    tag = "TOTP",
    responses(
        (status = 200, description = "TOTP state", body = TotpStatusResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn status(
    _admin: AdminBearer,
    State(state): State<AppState>,
) -> Result<Json<TotpStatusResponse>, ApiError> {
    let enabled = TotpRepository::new(state.kv.as_ref()).is_enabled().await?;
    Ok(Json(TotpStatusResponse { enabled }))
}

/// Generate a pending secret (valid for ten minutes).
#[utoipa::path(
    post,
    path = "/api/admin/totp/setup",
    tag = "TOTP",
    responses(
        (status = 200, description = "Pending secret created", body = TotpSetupResponse),
        (status = 400, description = "TOTP already enabled"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn setup(
    admin: AdminBearer,
    State(state): State<AppState>,
) -> Result<Json<TotpSetupResponse>, ApiError> {
    let repo = TotpRepository::new(state.kv.as_ref());
    if repo.is_enabled().await? {
        return Err(ApiError::bad_request(
            "TOTP is already enabled; disable it before enrolling again",
        ));
    }

    let secret = totp::generate_secret().map_err(|e| {
        tracing::error!(error = %e, "Failed to generate TOTP secret");
        ApiError::internal("Failed to generate secret")
    })?;
    let uri = totp::enrollment_uri(&state.config.totp_issuer, &secret.base32).map_err(|e| {
        tracing::error!(error = %e, "Failed to build enrollment URI");
        ApiError::internal("Failed to generate secret")
    })?;

    repo.store_pending(&secret.base32).await?;
    tracing::info!(ip = %admin.ip, "TOTP enrollment started");

    Ok(Json(TotpSetupResponse {
        raw: secret.hex(),
        secret: secret.base32,
        uri,
    }))
}

/// Confirm the pending secret with a code and enable TOTP.
#[utoipa::path(
    post,
    path = "/api/admin/totp/confirm",
    tag = "TOTP",
    request_body = TotpCodeRequest,
    responses(
        (status = 200, description = "TOTP enabled", body = OkResponse),
        (status = 400, description = "Missing code or no pending setup"),
        (status = 401, description = "Unauthorized or wrong code")
    )
)]
pub async fn confirm(
    admin: AdminBearer,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TotpCodeRequest>,
) -> Result<Json<OkResponse>, TotpFlowError> {
    let code = required_code(&request)?;
    let repo = TotpRepository::new(state.kv.as_ref());
    let pending = repo
        .pending()
        .await?
        .ok_or_else(|| ApiError::bad_request("No pending TOTP setup; run setup first"))?;

    AdminGate::new(&state)
        .check_code(&admin.ip, &pending, code)
        .await?;

    repo.enable(&pending).await?;
    tracing::info!(ip = %admin.ip, "TOTP enabled");
    Ok(Json(OkResponse::ok()))
}

/// Disable TOTP after checking a code from the current secret.
#[utoipa::path(
    delete,
    path = "/api/admin/totp/disable",
    tag = "TOTP",
    request_body = TotpCodeRequest,
    responses(
        (status = 200, description = "TOTP disabled", body = OkResponse),
        (status = 400, description = "Missing code or TOTP not enabled"),
        (status = 401, description = "Unauthorized or wrong code")
    )
)]
pub async fn disable(
    admin: AdminBearer,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TotpCodeRequest>,
) -> Result<Json<OkResponse>, TotpFlowError> {
    let code = required_code(&request)?;
    let repo = TotpRepository::new(state.kv.as_ref());
    if !repo.is_enabled().await? {
        return Err(ApiError::bad_request("TOTP is not enabled").into());
    }
    let secret = repo.secret().await?.unwrap_or_default();

    AdminGate::new(&state)
        .check_code(&admin.ip, &secret, code)
        .await?;

    repo.disable().await?;
    tracing::info!(ip = %admin.ip, "TOTP disabled");
    Ok(Json(OkResponse::ok()))
}
