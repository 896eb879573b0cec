// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process key-value store.
//!
//! Default backend for development and tests. State is lost on restart.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::kv::{KeyPage, KvStore, StoreResult, SWEEP_INTERVAL};
use crate::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: Option<i64>,
}

impl Entry {
    fn is_live(&self, now_ms: i64) -> bool {
        self.expires_at_ms.map_or(true, |at| now_ms < at)
    }
}

/// `BTreeMap`-backed store with lazy TTL expiry.
///
/// Expired entries are hidden immediately and dropped by a sweep that runs
/// on `put` at most once per [`SWEEP_INTERVAL`].
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    last_sweep_ms: AtomicI64,
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryKv {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            last_sweep_ms: AtomicI64::new(clock.now_ms()),
            clock,
        }
    }

    fn sweep_due(&self, now_ms: i64) -> bool {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        now_ms.saturating_sub(last) >= SWEEP_INTERVAL.as_millis() as i64
            && self
                .last_sweep_ms
                .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
    }

    /// Number of live keys (test helper).
    pub async fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now_ms();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        let now = self.clock.now_ms();
        let expires_at_ms = ttl.map(|t| now.saturating_add(t.as_millis() as i64));
        let mut entries = self.entries.write().await;
        if self.sweep_due(now) {
            entries.retain(|_, e| e.is_live(now));
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> StoreResult<KeyPage> {
        let now = self.clock.now_ms();
        let entries = self.entries.read().await;

        let start = match cursor {
            Some(c) => Bound::Excluded(c.to_string()),
            None => Bound::Included(prefix.to_string()),
        };

        let mut keys = Vec::new();
        let mut more = false;
        for (key, entry) in entries.range((start, Bound::Unbounded)) {
            if !key.starts_with(prefix) {
                break;
            }
            if !entry.is_live(now) {
                continue;
            }
            if keys.len() == limit {
                more = true;
                break;
            }
            keys.push(key.clone());
        }

        let cursor = if more { keys.last().cloned() } else { None };
        Ok(KeyPage { keys, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn store() -> (MemoryKv, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (MemoryKv::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let (kv, _) = store();
        assert!(kv.get("a").await.unwrap().is_none());

        kv.put("a", "1".into(), None).await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("1"));

        kv.delete("a").await.unwrap();
        assert!(kv.get("a").await.unwrap().is_none());
        kv.delete("a").await.unwrap();
    }

    #[tokio::test]
    async fn ttl_expires_keys() {
        let (kv, clock) = store();
        kv.put("visitor:x", "1".into(), Some(Duration::from_secs(120)))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(119));
        assert!(kv.get("visitor:x").await.unwrap().is_some());

        clock.advance(Duration::from_secs(1));
        assert!(kv.get("visitor:x").await.unwrap().is_none());
        assert_eq!(kv.len().await, 0);
    }

    #[tokio::test]
    async fn put_refreshes_ttl() {
        let (kv, clock) = store();
        kv.put("k", "1".into(), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(8));
        kv.put("k", "2".into(), Some(Duration::from_secs(10)))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(8));
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn list_paginates_by_prefix() {
        let (kv, clock) = store();
        for i in 0..5 {
            kv.put(&format!("visitor:{i}"), "1".into(), None)
                .await
                .unwrap();
        }
        kv.put("visitor:expired", "1".into(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        kv.put("wallet:abc", "{}".into(), None).await.unwrap();
        clock.advance(Duration::from_secs(2));

        let first = kv.list("visitor:", None, 2).await.unwrap();
        assert_eq!(first.keys, vec!["visitor:0", "visitor:1"]);
        let cursor = first.cursor.expect("more keys remain");

        let second = kv.list("visitor:", Some(&cursor), 2).await.unwrap();
        assert_eq!(second.keys, vec!["visitor:2", "visitor:3"]);

        let third = kv
            .list("visitor:", second.cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(third.keys, vec!["visitor:4"]);
        assert!(third.cursor.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_swept_periodically() {
        let (kv, clock) = store();
        for i in 0..50 {
            kv.put(&format!("visitor:{i}"), "1".into(), Some(Duration::from_secs(30)))
                .await
                .unwrap();
        }
        clock.advance(Duration::from_secs(31));
        kv.put("stats:global", "{}".into(), None).await.unwrap();
        // Hidden at once, but not yet swept.
        assert_eq!(kv.len().await, 1);
        assert_eq!(kv.entries.read().await.len(), 51);

        clock.advance(SWEEP_INTERVAL);
        kv.put("stats:global", "{}".into(), None).await.unwrap();
        assert_eq!(kv.entries.read().await.len(), 1);
    }
}
