// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable brute-force lockout for admin authentication.
//!
//! Each failed attempt from an IP bumps a counter whose TTL is refreshed to
//! one hour. Reaching [`MAX_FAILED_ATTEMPTS`] blocks the IP until the key
//! expires; there is no other reset path.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::super::kv::{read_json, write_json, KvStore, StoreResult};
use super::super::keys;

/// Failures that trigger a block.
pub const MAX_FAILED_ATTEMPTS: u32 = 10;
/// Lifetime of the failure counter after the latest failure.
pub const LOCKOUT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockoutRecord {
    pub count: u32,
}

/// Repository for the per-IP lockout counters.
pub struct LockoutRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> LockoutRepository<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    pub async fn failures(&self, ip: &str) -> StoreResult<u32> {
        let record: LockoutRecord = read_json(self.kv, &keys::admin_blocked(ip)).await?;
        Ok(record.count)
    }

    pub async fn is_blocked(&self, ip: &str) -> StoreResult<bool> {
        Ok(self.failures(ip).await? >= MAX_FAILED_ATTEMPTS)
    }

    /// Increment-or-create the counter and refresh its TTL.
    ///
    /// Returns the new failure count.
    pub async fn record_failure(&self, ip: &str) -> StoreResult<u32> {
        let key = keys::admin_blocked(ip);
        let mut record: LockoutRecord = read_json(self.kv, &key).await?;
        record.count = record.count.saturating_add(1);
        write_json(self.kv, &key, &record, Some(LOCKOUT_TTL)).await?;

        if record.count >= MAX_FAILED_ATTEMPTS {
            tracing::warn!(ip, failures = record.count, "Admin access blocked for IP");
        } else {
            tracing::info!(ip, failures = record.count, "Recorded failed admin attempt");
        }
        Ok(record.count)
    }
}
