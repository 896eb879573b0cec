// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the key-value store.
//!
//! Each repository borrows a `&dyn KvStore` and owns the read-merge-write
//! logic for one family of keys.

pub mod analytics;
pub mod lockout;
pub mod stats;
pub mod totp;

pub use analytics::AnalyticsRepository;
pub use lockout::LockoutRepository;
pub use stats::{NewReclaim, RecordOutcome, StatsRepository};
pub use totp::TotpRepository;
