// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key-value store contract.
//!
//! The backend is a single global namespace of string keys holding either a
//! JSON document or a plain scalar string. There are no transactions and no
//! conditional writes: callers read, merge in memory and write back, and two
//! concurrent writers to the same key resolve as last-writer-wins.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Error type for key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Minimum spacing between full expiry sweeps in the backends.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    /// Keys in lexical order.
    pub keys: Vec<String>,
    /// Resume point for the next call; `None` once the listing is complete.
    pub cursor: Option<String>,
}

/// Eventually-consistent key-value store.
///
/// Expired keys behave exactly like absent keys for every operation.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous value and TTL.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// List live keys starting with `prefix`, strictly after `cursor`.
    async fn list(&self, prefix: &str, cursor: Option<&str>, limit: usize)
        -> StoreResult<KeyPage>;
}

/// Read a JSON document; an absent key yields `T::default()`.
///
/// A document that no longer decodes is an error rather than a default, so
/// a read-merge-write caller never overwrites lifetime totals with zeros.
pub async fn read_json<T>(kv: &dyn KvStore, key: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = kv.get(key).await? else {
        return Ok(T::default());
    };

    serde_json::from_str(&raw).map_err(|e| {
        tracing::error!(key, error = %e, "Stored document does not decode");
        StoreError::Serde(e)
    })
}

/// Serialize and write a JSON document.
pub async fn write_json<T>(
    kv: &dyn KvStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> StoreResult<()>
where
    T: Serialize + Sync,
{
    let raw = serde_json::to_string(value)?;
    kv.put(key, raw, ttl).await
}

/// Read a plain integer counter (absent or non-numeric ⇒ 0).
pub async fn read_counter(kv: &dyn KvStore, key: &str) -> StoreResult<u64> {
    Ok(kv
        .get(key)
        .await?
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0))
}
