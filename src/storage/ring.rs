// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded newest-first feeds.
//!
//! A feed is persisted as a flat JSON array under a single key. Repositories
//! only touch it through [`load_feed`] / [`save_feed`] and the
//! [`RingBuffer`] type, so the backing representation can change without
//! touching the aggregation logic.

use std::collections::VecDeque;

use serde::{de::DeserializeOwned, Serialize};

use super::kv::{read_json, write_json, KvStore, StoreResult};

/// Fixed-capacity list, newest entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Wrap existing entries. Oversized input is cut down to `capacity`,
    /// keeping the newest entries.
    pub fn from_vec(items: Vec<T>, capacity: usize) -> Self {
        let mut items = VecDeque::from(items);
        items.truncate(capacity);
        Self { items, capacity }
    }

    /// Insert at the front, then drop whatever no longer fits.
    pub fn push_front(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into()
    }
}

/// Read a feed; absent key ⇒ empty feed.
pub async fn load_feed<T>(kv: &dyn KvStore, key: &str, capacity: usize) -> StoreResult<RingBuffer<T>>
where
    T: DeserializeOwned,
{
    let items: Vec<T> = read_json(kv, key).await?;
    Ok(RingBuffer::from_vec(items, capacity))
}

/// Persist a feed as a JSON array.
pub async fn save_feed<T>(kv: &dyn KvStore, key: &str, feed: &RingBuffer<T>) -> StoreResult<()>
where
    T: Serialize + Sync,
{
    let items: Vec<&T> = feed.iter().collect();
    write_json(kv, key, &items, None).await
}
