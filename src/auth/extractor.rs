// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for admin-protected reads.
//!
//! ```rust,ignore
//! async fn dashboard(_admin: AdminBearer, State(state): State<AppState>) -> ... {
//!     // the bearer token matched
//! }
//! ```
//!
//! Only the bearer token is checked here. The second factor gates the
//! initial `/api/admin/verify` handshake, not every subsequent request.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::client_ip::resolve_client_ip;
use super::{AdminGate, AuthError};
use crate::state::AppState;

/// Proof that the request carried the admin bearer token.
///
/// Holds the resolved client IP so handlers that run further checks (TOTP
/// confirm/disable) can charge failures to the same lockout bucket.
#[derive(Debug, Clone)]
pub struct AdminBearer {
    pub ip: String,
}

impl FromRequestParts<AppState> for AdminBearer {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ip = resolve_client_ip(&parts.headers, &state.config.client_ip_header);
        AdminGate::new(state).check_bearer(&ip, &parts.headers).await?;
        Ok(AdminBearer { ip })
    }
}
