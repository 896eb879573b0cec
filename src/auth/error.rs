// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StoreError;

/// Authentication error type.
///
/// Every non-`ok` outcome of the admin authenticator maps onto one of these.
/// `TotpRequired` is not a failure: it tells the caller to prompt for a code.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Bearer token does not match the admin token
    InvalidToken,
    /// TOTP code did not verify
    InvalidTotp,
    /// No admin token configured on this instance
    NotConfigured,
    /// Durable lockout reached for this IP
    Blocked,
    /// In-memory admin rate limit exceeded
    RateLimited,
    /// Token accepted, second factor needed
    TotpRequired,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TotpRequiredBody {
    totp_required: bool,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::InvalidTotp => "invalid_totp",
            AuthError::NotConfigured => "admin_not_configured",
            AuthError::Blocked => "blocked",
            AuthError::RateLimited => "rate_limited",
            AuthError::TotpRequired => "totp_required",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken
            | AuthError::InvalidTotp
            | AuthError::NotConfigured => StatusCode::UNAUTHORIZED,
            AuthError::TotpRequired => StatusCode::FORBIDDEN,
            AuthError::Blocked | AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this outcome counts against the durable lockout.
    pub fn counts_as_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
                | AuthError::InvalidToken
                | AuthError::InvalidTotp
        )
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Unauthorized"),
            AuthError::InvalidTotp => write!(f, "Invalid TOTP code"),
            AuthError::NotConfigured => write!(f, "Admin access is not configured"),
            AuthError::Blocked => write!(f, "Too many failed attempts. Try again later."),
            AuthError::RateLimited => write!(f, "Too many requests. Try again later."),
            AuthError::TotpRequired => write!(f, "TOTP code required"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Key-value store failed during admin authentication");
        AuthError::InternalError("storage unavailable".to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::TotpRequired = self {
            return (status, Json(TotpRequiredBody { totp_required: true })).into_response();
        }

        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn totp_required_is_a_bare_403_signal() {
        let response = AuthError::TotpRequired.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await, serde_json::json!({ "totpRequired": true }));
    }

    #[tokio::test]
    async fn blocked_and_rate_limited_return_429() {
        for err in [AuthError::Blocked, AuthError::RateLimited] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            assert!(body_json(response).await["error"].is_string());
        }
    }

    #[test]
    fn only_bad_credentials_count_as_failures() {
        assert!(AuthError::InvalidToken.counts_as_failure());
        assert!(AuthError::InvalidTotp.counts_as_failure());
        assert!(!AuthError::TotpRequired.counts_as_failure());
        assert!(!AuthError::Blocked.counts_as_failure());
        assert!(!AuthError::NotConfigured.counts_as_failure());
    }
}
