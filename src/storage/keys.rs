// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key layout of the shared key-value namespace.
//!
//! ```text
//! stats:global                           GlobalStats
//! stats:recent                           RecentReclaim[]   (≤10, newest first)
//! stats:history                          ReclaimHistory[]  (≤200, newest first)
//! wallet:<address>                       WalletStats
//! analytics:reclaims:daily:<YYYY-MM-DD>  PeriodReclaims
//! analytics:reclaims:monthly:<YYYY-MM>   PeriodReclaims
//! analytics:views:daily:<YYYY-MM-DD>     DailyViews
//! analytics:views:monthly:<YYYY-MM>      MonthlyViews
//! analytics:social:<button>              plain integer
//! visitor:<sessionId>                    "1", TTL 120s
//! admin:blocked:<ip>                     LockoutRecord, TTL 3600s
//! admin:totp:secret                      Base32 secret
//! admin:totp:pending                     Base32 secret, TTL 600s
//! admin:totp:enabled                     "true"
//! ```

use chrono::NaiveDate;

use crate::clock::{day_key, month_key};

pub const GLOBAL_STATS: &str = "stats:global";
pub const RECENT_RECLAIMS: &str = "stats:recent";
pub const RECLAIM_HISTORY: &str = "stats:history";

pub const VISITOR_PREFIX: &str = "visitor:";
pub const ADMIN_BLOCKED_PREFIX: &str = "admin:blocked:";

pub const TOTP_SECRET: &str = "admin:totp:secret";
pub const TOTP_PENDING: &str = "admin:totp:pending";
pub const TOTP_ENABLED: &str = "admin:totp:enabled";

// ========== Stats ==========

pub fn wallet(address: &str) -> String {
    format!("wallet:{address}")
}

pub fn daily_reclaims(date: NaiveDate) -> String {
    format!("analytics:reclaims:daily:{}", day_key(date))
}

pub fn monthly_reclaims(date: NaiveDate) -> String {
    format!("analytics:reclaims:monthly:{}", month_key(date))
}

// ========== Analytics ==========

pub fn daily_views(date: NaiveDate) -> String {
    format!("analytics:views:daily:{}", day_key(date))
}

pub fn monthly_views(date: NaiveDate) -> String {
    format!("analytics:views:monthly:{}", month_key(date))
}

pub fn social_clicks(button: &str) -> String {
    format!("analytics:social:{button}")
}

pub fn visitor(session_id: &str) -> String {
    format!("{VISITOR_PREFIX}{session_id}")
}

// ========== Admin ==========

pub fn admin_blocked(ip: &str) -> String {
    format!("{ADMIN_BLOCKED_PREFIX}{ip}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(wallet("Abc"), "wallet:Abc");
        assert_eq!(daily_reclaims(date), "analytics:reclaims:daily:2026-01-05");
        assert_eq!(monthly_reclaims(date), "analytics:reclaims:monthly:2026-01");
        assert_eq!(daily_views(date), "analytics:views:daily:2026-01-05");
        assert_eq!(monthly_views(date), "analytics:views:monthly:2026-01");
        assert_eq!(social_clicks("x"), "analytics:social:x");
        assert_eq!(visitor("s1"), "visitor:s1");
        assert_eq!(admin_blocked("1.2.3.4"), "admin:blocked:1.2.3.4");
    }
}
