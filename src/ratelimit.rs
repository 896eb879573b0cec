// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process rate limiting keyed by client IP.
//!
//! Counters live in a bounded LRU map and are lost on restart. The durable
//! admin lockout in the store is the backstop for the security-sensitive
//! path; these limiters only shave off bursts.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;

use crate::clock::Clock;

/// General traffic: requests per window.
pub const GENERAL_LIMIT: u32 = 120;
/// Admin verification attempts per window.
pub const ADMIN_LIMIT: u32 = 5;
pub const WINDOW: Duration = Duration::from_secs(60);
/// Distinct IPs tracked per limiter before the least recent is evicted.
pub const TRACKED_CLIENTS: usize = 10_000;

struct Window {
    started_ms: i64,
    count: u32,
}

/// Fixed window counter per key.
///
/// The first request from a key opens a window; each later request inside
/// the window bumps the counter. Once the counter passes `limit` the key is
/// limited until the window rolls over.
pub struct WindowLimiter {
    windows: Mutex<LruCache<String, Window>>,
    limit: u32,
    window_ms: i64,
    clock: Arc<dyn Clock>,
}

impl WindowLimiter {
    pub fn new(limit: u32, window: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            windows: Mutex::new(LruCache::new(capacity)),
            limit,
            window_ms: window.as_millis() as i64,
            clock,
        }
    }

    /// Count one request for `key`; returns `true` while it is within limits.
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let Ok(mut windows) = self.windows.lock() else {
            // A poisoned map only loses soft limits; let the request through.
            return true;
        };

        if let Some(window) = windows.get_mut(key) {
            if now - window.started_ms < self.window_ms {
                window.count = window.count.saturating_add(1);
                return window.count <= self.limit;
            }
        }

        windows.put(
            key.to_string(),
            Window {
                started_ms: now,
                count: 1,
            },
        );
        self.limit >= 1
    }
}

/// The two independent limiter tables.
pub struct RateLimits {
    pub general: WindowLimiter,
    pub admin: WindowLimiter,
}

impl RateLimits {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            general: WindowLimiter::new(GENERAL_LIMIT, WINDOW, TRACKED_CLIENTS, clock.clone()),
            admin: WindowLimiter::new(ADMIN_LIMIT, WINDOW, TRACKED_CLIENTS, clock),
        }
    }

    pub fn check_general(&self, ip: &str) -> bool {
        self.general.check(ip)
    }

    pub fn check_admin(&self, ip: &str) -> bool {
        self.admin.check(ip)
    }
}
