// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistent key-value store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `kv`: key → JSON `{ "value": <string>, "expiresAt": <unix ms | null> }`
//!
//! Each operation is its own redb transaction, with the same last-writer-wins
//! contract as the in-memory backend.
//!
//! Expired rows are deleted, not just hidden: `get` and `list` purge the
//! expired rows they step over, and `put` sweeps the whole table at most
//! once per [`SWEEP_INTERVAL`] so keys nobody reads again are reclaimed too.

use std::ops::Bound;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use super::kv::{KeyPage, KvStore, StoreError, StoreResult, SWEEP_INTERVAL};
use crate::clock::Clock;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: key → serialized [`StoredValue`] (JSON bytes).
const KV: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredValue {
    value: String,
    expires_at: Option<i64>,
}

impl StoredValue {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at.map_or(true, |at| now_ms < at)
    }
}

/// Whether a raw row is still live. Rows that fail to decode are kept so a
/// sweep never destroys data it cannot interpret.
fn raw_is_live(raw: &[u8], now_ms: i64) -> bool {
    serde_json::from_slice::<StoredValue>(raw).map_or(true, |stored| stored.is_live(now_ms))
}

// =============================================================================
// Error Conversions
// =============================================================================

macro_rules! backend_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(e: $ty) -> Self {
                    StoreError::Backend(e.to_string())
                }
            }
        )*
    };
}

backend_error!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

// =============================================================================
// RedbKv
// =============================================================================

/// redb-backed implementation of [`KvStore`].
pub struct RedbKv {
    db: Database,
    clock: Arc<dyn Clock>,
    last_sweep_ms: AtomicI64,
}

impl RedbKv {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV)?;
        }
        write_txn.commit()?;

        let last_sweep_ms = AtomicI64::new(clock.now_ms());
        Ok(Self {
            db,
            clock,
            last_sweep_ms,
        })
    }

    fn decode(bytes: &[u8]) -> StoreResult<StoredValue> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Delete `keys` that are still expired at `now_ms`.
    ///
    /// Expiry is re-checked inside the write transaction, so a key rewritten
    /// between the read and this call survives.
    fn purge(&self, keys: &[String], now_ms: i64) -> StoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let write_txn = self.db.begin_write()?;
        let mut removed = 0usize;
        {
            let mut table = write_txn.open_table(KV)?;
            for key in keys {
                let expired = match table.get(key.as_str())? {
                    Some(raw) => !raw_is_live(raw.value(), now_ms),
                    None => false,
                };
                if expired {
                    table.remove(key.as_str())?;
                    removed += 1;
                }
            }
        }
        write_txn.commit()?;
        tracing::trace!(removed, "Purged expired keys");
        Ok(())
    }

    /// Claim the sweep slot if the last sweep is older than [`SWEEP_INTERVAL`].
    fn sweep_due(&self, now_ms: i64) -> bool {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        now_ms.saturating_sub(last) >= SWEEP_INTERVAL.as_millis() as i64
            && self
                .last_sweep_ms
                .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
    }
}

#[async_trait]
impl KvStore for RedbKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now_ms();
        let stored = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(KV)?;
            match table.get(key)? {
                Some(raw) => Self::decode(raw.value())?,
                None => return Ok(None),
            }
        };

        if stored.is_live(now) {
            return Ok(Some(stored.value));
        }
        self.purge(&[key.to_string()], now)?;
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        let now = self.clock.now_ms();
        let stored = StoredValue {
            value,
            expires_at: ttl.map(|t| now.saturating_add(t.as_millis() as i64)),
        };
        let json = serde_json::to_vec(&stored)?;

        let sweep = self.sweep_due(now);
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            if sweep {
                table.retain(|_, raw| raw_is_live(raw, now))?;
            }
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        if sweep {
            tracing::debug!("Swept expired keys");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<KeyPage> {
        let now = self.clock.now_ms();
        let start = match cursor {
            Some(c) => Bound::Excluded(c),
            None => Bound::Included(prefix),
        };

        let mut keys = Vec::new();
        let mut expired = Vec::new();
        let mut more = false;
        {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(KV)?;
            for item in table.range::<&str>((start, Bound::Unbounded))? {
                let (key, raw) = item?;
                let key = key.value();
                if !key.starts_with(prefix) {
                    break;
                }
                if !Self::decode(raw.value())?.is_live(now) {
                    expired.push(key.to_string());
                    continue;
                }
                if keys.len() == limit {
                    more = true;
                    break;
                }
                keys.push(key.to_string());
            }
        }

        self.purge(&expired, now)?;

        let cursor = if more { keys.last().cloned() } else { None };
        Ok(KeyPage { keys, cursor })
    }
}
