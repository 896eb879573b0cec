// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted TOTP enrollment state.
//!
//! - `admin:totp:pending` holds a freshly generated secret for ten minutes
//!   while the admin scans it into an authenticator app.
//! - `admin:totp:secret` holds the confirmed secret.
//! - `admin:totp:enabled` (`"true"`) gates whether verification is required.

use std::time::Duration;

use super::super::keys;
use super::super::kv::{KvStore, StoreResult};

/// Lifetime of an unconfirmed enrollment secret.
pub const PENDING_TTL: Duration = Duration::from_secs(600);

pub struct TotpRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> TotpRepository<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    pub async fn is_enabled(&self) -> StoreResult<bool> {
        Ok(self.kv.get(keys::TOTP_ENABLED).await?.as_deref() == Some("true"))
    }

    /// Confirmed secret, if any.
    pub async fn secret(&self) -> StoreResult<Option<String>> {
        self.kv.get(keys::TOTP_SECRET).await
    }

    pub async fn pending(&self) -> StoreResult<Option<String>> {
        self.kv.get(keys::TOTP_PENDING).await
    }

    pub async fn store_pending(&self, secret: &str) -> StoreResult<()> {
        self.kv
            .put(keys::TOTP_PENDING, secret.to_string(), Some(PENDING_TTL))
            .await
    }

    /// Promote a confirmed secret and switch verification on.
    pub async fn enable(&self, secret: &str) -> StoreResult<()> {
        tokio::try_join!(
            self.kv.put(keys::TOTP_SECRET, secret.to_string(), None),
            self.kv.put(keys::TOTP_ENABLED, "true".to_string(), None),
        )?;
        self.kv.delete(keys::TOTP_PENDING).await
    }

    pub async fn disable(&self) -> StoreResult<()> {
        tokio::try_join!(
            self.kv.delete(keys::TOTP_SECRET),
            self.kv.delete(keys::TOTP_ENABLED),
        )?;
        Ok(())
    }
}
