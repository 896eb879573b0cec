// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin authentication state machine.
//!
//! A verification attempt walks these steps and stops at the first terminal
//! outcome:
//!
//! 1. durable lockout (`admin:blocked:<ip>` count ≥ 10) ⇒ blocked
//! 2. in-memory admin rate limit exceeded ⇒ blocked
//! 3. bearer token mismatch ⇒ failure recorded, unauthorized
//! 4. TOTP disabled ⇒ ok
//! 5. no code supplied ⇒ totp-required (not a failure)
//! 6. code does not verify ⇒ failure recorded, unauthorized; else ok
//!
//! Other admin endpoints only run step 3 through [`AdminGate::check_bearer`].

use axum::http::HeaderMap;

use super::token::{bearer_token, tokens_match};
use super::AuthError;
use crate::clock::Clock;
use crate::state::AppState;
use crate::storage::{LockoutRepository, TotpRepository};
use crate::totp;

pub struct AdminGate<'a> {
    state: &'a AppState,
}

impl<'a> AdminGate<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Full handshake used by `POST /api/admin/verify`.
    pub async fn verify(
        &self,
        ip: &str,
        headers: &HeaderMap,
        totp_code: Option<&str>,
    ) -> Result<(), AuthError> {
        let lockout = LockoutRepository::new(self.state.kv.as_ref());
        if lockout.is_blocked(ip).await? {
            tracing::warn!(ip, "Rejected admin verification from locked out IP");
            return Err(AuthError::Blocked);
        }

        if !self.state.limits.check_admin(ip) {
            tracing::warn!(ip, "Admin verification rate limit exceeded");
            return Err(AuthError::RateLimited);
        }

        self.check_bearer(ip, headers).await?;

        let totp_state = TotpRepository::new(self.state.kv.as_ref());
        if !totp_state.is_enabled().await? {
            return Ok(());
        }

        let Some(code) = totp_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return Err(AuthError::TotpRequired);
        };

        let secret = totp_state.secret().await?.unwrap_or_default();
        self.check_code(ip, &secret, code).await
    }

    /// Bearer token check, recording a lockout failure on mismatch.
    pub async fn check_bearer(&self, ip: &str, headers: &HeaderMap) -> Result<(), AuthError> {
        let Some(expected) = self.state.config.admin_token.as_deref() else {
            tracing::warn!(ip, "Admin request rejected: no admin token configured");
            return Err(AuthError::NotConfigured);
        };

        match bearer_token(headers) {
            Ok(token) if tokens_match(token, expected) => Ok(()),
            Ok(_) => self.fail(ip, AuthError::InvalidToken).await,
            Err(err) => self.fail(ip, err).await,
        }
    }

    /// Verify a TOTP code against `secret_base32`, recording a lockout
    /// failure when it does not match.
    pub async fn check_code(
        &self,
        ip: &str,
        secret_base32: &str,
        code: &str,
    ) -> Result<(), AuthError> {
        if totp::verify(secret_base32, code, self.state.clock.now_ms()) {
            return Ok(());
        }
        self.fail(ip, AuthError::InvalidTotp).await
    }

    async fn fail(&self, ip: &str, err: AuthError) -> Result<(), AuthError> {
        if err.counts_as_failure() {
            LockoutRepository::new(self.state.kv.as_ref())
                .record_failure(ip)
                .await?;
        }
        tracing::info!(ip, reason = err.error_code(), "Admin authentication failed");
        Err(err)
    }
}
