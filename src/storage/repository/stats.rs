// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reclaim statistics repository.
//!
//! Every accepted reclaim event updates six independent keys: the global
//! totals, the wallet's totals, the public recent feed, the admin history
//! feed, and the day and month reclaim aggregates. All six are read
//! concurrently, merged in memory, then written concurrently.
//!
//! ## Consistency
//!
//! The store has no compare-and-swap, so two overlapping reclaims that touch
//! the same key can lose one increment (last writer wins). If one of the six
//! writes fails the others may already have landed; the request reports a
//! storage error and the partial update stays.

use chrono::NaiveDate;
use uuid::Uuid;

use super::super::kv::{read_json, write_json, KvStore, StoreResult};
use super::super::keys;
use super::super::ring::{load_feed, save_feed, RingBuffer};
use crate::clock::date_of;
use crate::models::{
    GlobalStats, PeriodReclaims, RecentReclaim, ReclaimHistoryEntry, ReclaimReport, SolanaAddress,
    WalletStats,
};

/// Capacity of the public recent-reclaims feed.
pub const RECENT_CAPACITY: usize = 10;
/// Capacity of the admin reclaim history.
pub const HISTORY_CAPACITY: usize = 200;
/// Signatures kept per history entry.
pub const MAX_SIGNATURES: usize = 25;

/// A reclaim report that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReclaim {
    pub wallet: SolanaAddress,
    pub sol: f64,
    pub accounts: u64,
    pub signatures: Vec<String>,
}

impl NewReclaim {
    /// Validate a raw report.
    ///
    /// The error string is returned verbatim to the caller.
    pub fn validate(report: ReclaimReport) -> Result<Self, String> {
        let wallet = SolanaAddress::parse(report.wallet.trim())
            .ok_or_else(|| "wallet must be a valid Solana address".to_string())?;

        if !report.sol_reclaimed.is_finite() || report.sol_reclaimed < 0.0 {
            return Err("solReclaimed must be a non-negative number".to_string());
        }

        let accounts = report.accounts_closed;
        if !accounts.is_finite() || accounts < 0.0 || accounts.fract() != 0.0 {
            return Err("accountsClosed must be a non-negative integer".to_string());
        }
        if accounts > u32::MAX as f64 {
            return Err("accountsClosed is out of range".to_string());
        }

        let signatures = report
            .signatures
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .take(MAX_SIGNATURES)
            .collect();

        Ok(Self {
            wallet,
            sol: report.sol_reclaimed,
            accounts: accounts as u64,
            signatures,
        })
    }
}

/// What a recorded reclaim changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub new_wallet: bool,
    pub global: GlobalStats,
    pub wallet: WalletStats,
}

/// Repository for reclaim aggregates.
pub struct StatsRepository<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> StatsRepository<'a> {
    /// Create a new StatsRepository.
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// Fold one reclaim event into every aggregate.
    pub async fn record_reclaim(&self, reclaim: &NewReclaim, now_ms: i64) -> StoreResult<RecordOutcome> {
        let date = date_of(now_ms);
        let wallet_key = keys::wallet(reclaim.wallet.as_str());
        let daily_key = keys::daily_reclaims(date);
        let monthly_key = keys::monthly_reclaims(date);

        let (mut global, mut wallet, mut recent, mut history, mut daily, mut monthly) = tokio::try_join!(
            read_json::<GlobalStats>(self.kv, keys::GLOBAL_STATS),
            read_json::<WalletStats>(self.kv, &wallet_key),
            load_feed::<RecentReclaim>(self.kv, keys::RECENT_RECLAIMS, RECENT_CAPACITY),
            load_feed::<ReclaimHistoryEntry>(self.kv, keys::RECLAIM_HISTORY, HISTORY_CAPACITY),
            read_json::<PeriodReclaims>(self.kv, &daily_key),
            read_json::<PeriodReclaims>(self.kv, &monthly_key),
        )?;

        let new_wallet = wallet.uses == 0;

        global.total_sol_reclaimed += reclaim.sol;
        global.total_accounts_closed += reclaim.accounts;
        if new_wallet {
            global.total_wallets += 1;
        }

        wallet.total_sol_reclaimed += reclaim.sol;
        wallet.total_accounts_closed += reclaim.accounts;
        wallet.uses += 1;

        recent.push_front(RecentReclaim {
            wallet: reclaim.wallet.shortened(),
            sol_reclaimed: reclaim.sol,
            accounts_closed: reclaim.accounts,
            timestamp: now_ms,
        });

        history.push_front(ReclaimHistoryEntry {
            id: Uuid::new_v4().to_string(),
            wallet: reclaim.wallet.to_string(),
            sol_reclaimed: reclaim.sol,
            accounts_closed: reclaim.accounts,
            signatures: reclaim.signatures.clone(),
            timestamp: now_ms,
        });

        daily.add(reclaim.sol, reclaim.accounts);
        monthly.add(reclaim.sol, reclaim.accounts);

        tokio::try_join!(
            write_json(self.kv, keys::GLOBAL_STATS, &global, None),
            write_json(self.kv, &wallet_key, &wallet, None),
            save_feed(self.kv, keys::RECENT_RECLAIMS, &recent),
            save_feed(self.kv, keys::RECLAIM_HISTORY, &history),
            write_json(self.kv, &daily_key, &daily, None),
            write_json(self.kv, &monthly_key, &monthly, None),
        )?;

        tracing::debug!(
            new_wallet,
            accounts = reclaim.accounts,
            sol = reclaim.sol,
            "Recorded reclaim"
        );

        Ok(RecordOutcome {
            new_wallet,
            global,
            wallet,
        })
    }

    /// Lifetime totals (zero-valued when nothing was recorded yet).
    pub async fn global(&self) -> StoreResult<GlobalStats> {
        read_json(self.kv, keys::GLOBAL_STATS).await
    }

    /// Totals for one wallet.
    pub async fn wallet(&self, wallet: &SolanaAddress) -> StoreResult<WalletStats> {
        read_json(self.kv, &keys::wallet(wallet.as_str())).await
    }

    /// Public feed, newest first.
    pub async fn recent(&self) -> StoreResult<Vec<RecentReclaim>> {
        Ok(load_feed(self.kv, keys::RECENT_RECLAIMS, RECENT_CAPACITY)
            .await?
            .into_vec())
    }

    /// Admin history, newest first.
    pub async fn history(&self) -> StoreResult<RingBuffer<ReclaimHistoryEntry>> {
        load_feed(self.kv, keys::RECLAIM_HISTORY, HISTORY_CAPACITY).await
    }

    pub async fn daily(&self, date: NaiveDate) -> StoreResult<PeriodReclaims> {
        read_json(self.kv, &keys::daily_reclaims(date)).await
    }

    pub async fn monthly(&self, date: NaiveDate) -> StoreResult<PeriodReclaims> {
        read_json(self.kv, &keys::monthly_reclaims(date)).await
    }
}
