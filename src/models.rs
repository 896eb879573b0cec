// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the persisted aggregate documents and the request and
//! response bodies used by the REST API. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for JSON handling and OpenAPI documentation.
//! Field names are camelCase on the wire to match the web frontend.
//!
//! ## Address Type
//!
//! The [`SolanaAddress`] newtype wraps a base58-encoded Solana account
//! address (32-44 characters from the Bitcoin base58 alphabet).
//!
//! ## Model Categories
//!
//! - **Stats**: global, per-wallet and per-period reclaim aggregates
//! - **Feeds**: public recent-reclaim feed and admin reclaim history
//! - **Analytics**: page views, presence and social-click counters
//! - **Requests**: inbound event payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Solana Address Type
// =============================================================================

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Syntactically valid Solana account address.
///
/// Format: 32 to 44 characters from the base58 alphabet (no `0`, `O`, `I`, `l`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolanaAddress(String);

impl SolanaAddress {
    /// Validate and wrap an address.
    pub fn parse(value: &str) -> Option<Self> {
        let len_ok = (32..=44).contains(&value.len());
        let chars_ok = value.chars().all(|c| BASE58_ALPHABET.contains(c));
        (len_ok && chars_ok).then(|| SolanaAddress(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public-safe short form, e.g. `7xKX...AsU9`.
    pub fn shortened(&self) -> String {
        let s = &self.0;
        format!("{}...{}", &s[..4], &s[s.len() - 4..])
    }
}

impl std::fmt::Display for SolanaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Stats Documents
// =============================================================================

/// Lifetime totals across all wallets (`stats:global`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStats {
    pub total_sol_reclaimed: f64,
    pub total_accounts_closed: u64,
    pub total_wallets: u64,
}

/// Per-wallet totals (`wallet:<address>`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletStats {
    pub total_sol_reclaimed: f64,
    pub total_accounts_closed: u64,
    /// Zero means the wallet has never been recorded.
    pub uses: u64,
}

/// Reclaim totals for one day or one month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct PeriodReclaims {
    pub count: u64,
    pub sol: f64,
    pub accounts: u64,
}

impl PeriodReclaims {
    pub fn add(&mut self, sol: f64, accounts: u64) {
        self.count += 1;
        self.sol += sol;
        self.accounts += accounts;
    }
}

/// Public feed entry (`stats:recent`). Carries no signatures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentReclaim {
    /// Shortened wallet address.
    pub wallet: String,
    pub sol_reclaimed: f64,
    pub accounts_closed: u64,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Admin history entry (`stats:history`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimHistoryEntry {
    pub id: String,
    pub wallet: String,
    pub sol_reclaimed: f64,
    pub accounts_closed: u64,
    #[serde(default)]
    pub signatures: Vec<String>,
    /// Unix milliseconds.
    pub timestamp: i64,
}

// =============================================================================
// Analytics Documents
// =============================================================================

/// Page views for one day (`analytics:views:daily:<date>`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct DailyViews {
    pub total: u64,
    pub pages: BTreeMap<String, u64>,
    pub countries: BTreeMap<String, u64>,
}

/// Page views for one month (`analytics:views:monthly:<month>`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct MonthlyViews {
    pub total: u64,
}

// =============================================================================
// Request Models
// =============================================================================

/// Reclaim event reported by the frontend after a successful close.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimReport {
    pub sol_reclaimed: f64,
    pub accounts_closed: f64,
    pub wallet: String,
    /// Transaction signatures; non-string or empty entries are ignored.
    #[serde(default)]
    #[schema(value_type = Option<Vec<String>>)]
    pub signatures: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PageviewRequest {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SocialClickRequest {
    #[serde(default)]
    pub button: Option<String>,
}

/// Body of `POST /api/admin/verify`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VerifyRequest {
    #[serde(default)]
    pub totp: Option<String>,
}

/// Body of the TOTP confirm/disable endpoints.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TotpCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

// =============================================================================
// Response Models
// =============================================================================

/// Generic acknowledgement `{ "ok": true }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[test]
    fn accepts_base58_addresses() {
        let addr = SolanaAddress::parse(VALID).expect("valid address");
        assert_eq!(addr.as_str(), VALID);
        assert_eq!(addr.shortened(), "7xKX...gAsU");
        assert!(SolanaAddress::parse("11111111111111111111111111111111").is_some());
    }

    #[test]
    fn rejects_bad_addresses() {
        assert!(SolanaAddress::parse("").is_none());
        assert!(SolanaAddress::parse("short").is_none());
        // '0', 'O', 'I' and 'l' are not base58
        assert!(SolanaAddress::parse("0xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").is_none());
        assert!(SolanaAddress::parse("lxKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU").is_none());
        assert!(SolanaAddress::parse(&"1".repeat(45)).is_none());
    }

    #[test]
    fn aggregates_serialize_camel_case() {
        let json = serde_json::to_value(GlobalStats {
            total_sol_reclaimed: 1.5,
            total_accounts_closed: 3,
            total_wallets: 1,
        })
        .unwrap();
        assert_eq!(json["totalSolReclaimed"], 1.5);
        assert_eq!(json["totalAccountsClosed"], 3);
        assert_eq!(json["totalWallets"], 1);
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let stats: WalletStats = serde_json::from_str(r#"{"uses":2}"#).unwrap();
        assert_eq!(stats.uses, 2);
        assert_eq!(stats.total_accounts_closed, 0);

        let views: DailyViews = serde_json::from_str(r#"{"total":4}"#).unwrap();
        assert!(views.pages.is_empty());
    }

    #[test]
    fn reclaim_report_deserializes() {
        let report: ReclaimReport = serde_json::from_str(&format!(
            r#"{{"solReclaimed":0.5,"accountsClosed":3,"wallet":"{VALID}","signatures":["a",""]}}"#
        ))
        .unwrap();
        assert_eq!(report.sol_reclaimed, 0.5);
        assert_eq!(report.accounts_closed, 3.0);
        assert_eq!(report.signatures.unwrap().len(), 2);
    }
}
