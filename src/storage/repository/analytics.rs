// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anonymous usage analytics.
//!
//! Three unauthenticated write paths (presence heartbeats, page views and
//! social-button clicks) plus the read side used by the admin dashboard.
//! Like the reclaim aggregates, every counter is a read-merge-write.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;

use super::super::kv::{read_counter, read_json, write_json, KvStore, StoreResult};
use super::super::keys;
use crate::models::{DailyViews, MonthlyViews};

/// How long a heartbeat keeps a session counted as active.
pub const PRESENCE_TTL: Duration = Duration::from_secs(120);
/// Maximum accepted session identifier length.
pub const MAX_SESSION_ID_LEN: usize = 64;
/// Page paths are cut to this many characters.
pub const MAX_PAGE_LEN: usize = 100;
/// Country code used when the edge sends no geolocation.
pub const UNKNOWN_COUNTRY: &str = "XX";
/// Page recorded when the caller omits one.
pub const DEFAULT_PAGE: &str = "/";
/// Social buttons that may be counted.
pub const SOCIAL_BUTTONS: &[&str] = &["x", "telegram", "discord", "github"];

const LIST_PAGE_SIZE: usize = 1000;

/// Repository for analytics counters.
pub struct AnalyticsRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new AnalyticsRepository.
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// Mark a session as active for the next two minutes.
    ///
    /// Returns `false` (and writes nothing) for an empty or oversized id.
    pub async fn heartbeat(&self, session_id: &str) -> StoreResult<bool> {
        if !is_valid_session_id(session_id) {
            return Ok(false);
        }
        self.kv
            .put(&keys::visitor(session_id), "1".to_string(), Some(PRESENCE_TTL))
            .await?;
        Ok(true)
    }

    /// Count one page view for `date`.
    pub async fn pageview(
        &self,
        page: Option<&str>,
        country: Option<&str>,
        date: NaiveDate,
    ) -> StoreResult<()> {
        let page = normalize_page(page);
        let country = normalize_country(country);
        let daily_key = keys::daily_views(date);
        let monthly_key = keys::monthly_views(date);

        let (mut daily, mut monthly) = tokio::try_join!(
            read_json::<DailyViews>(self.kv, &daily_key),
            read_json::<MonthlyViews>(self.kv, &monthly_key),
        )?;

        daily.total += 1;
        *daily.pages.entry(page).or_default() += 1;
        *daily.countries.entry(country).or_default() += 1;
        monthly.total += 1;

        tokio::try_join!(
            write_json(self.kv, &daily_key, &daily, None),
            write_json(self.kv, &monthly_key, &monthly, None),
        )?;
        Ok(())
    }

    /// Count one click on an allow-listed social button.
    ///
    /// Returns `false` (and writes nothing) for unknown buttons.
    pub async fn social_click(&self, button: &str) -> StoreResult<bool> {
        if !SOCIAL_BUTTONS.contains(&button) {
            return Ok(false);
        }
        let key = keys::social_clicks(button);
        let count = read_counter(self.kv, &key).await?;
        self.kv.put(&key, (count + 1).to_string(), None).await?;
        Ok(true)
    }

    /// Lifetime click counters for every allow-listed button.
    pub async fn social_counts(&self) -> StoreResult<BTreeMap<String, u64>> {
        let mut counts = BTreeMap::new();
        for button in SOCIAL_BUTTONS {
            let count = read_counter(self.kv, &keys::social_clicks(button)).await?;
            counts.insert(button.to_string(), count);
        }
        Ok(counts)
    }

    pub async fn daily_views(&self, date: NaiveDate) -> StoreResult<DailyViews> {
        read_json(self.kv, &keys::daily_views(date)).await
    }

    pub async fn monthly_views(&self, date: NaiveDate) -> StoreResult<MonthlyViews> {
        read_json(self.kv, &keys::monthly_views(date)).await
    }

    /// Exhaustive count of live presence keys, walking the listing cursor.
    pub async fn active_visitors(&self) -> StoreResult<u64> {
        let mut total = 0u64;
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .kv
                .list(keys::VISITOR_PREFIX, cursor.as_deref(), LIST_PAGE_SIZE)
                .await?;
            total += page.keys.len() as u64;
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(total),
            }
        }
    }
}

pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty() && session_id.chars().count() <= MAX_SESSION_ID_LEN
}

fn normalize_page(page: Option<&str>) -> String {
    match page.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p.chars().take(MAX_PAGE_LEN).collect(),
        None => DEFAULT_PAGE.to_string(),
    }
}

fn normalize_country(country: Option<&str>) -> String {
    country
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
}
