// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! All persistent state lives in one eventually-consistent key-value
//! namespace behind the [`KvStore`] trait. Two backends are provided:
//!
//! - [`MemoryKv`]: in-process map, used in development and tests
//! - [`RedbKv`]: redb file on disk, selected with `KV_PATH`
//!
//! ## Important Notes
//!
//! - Values are JSON documents or plain scalar strings
//! - Absent keys read as zero-valued defaults; aggregates are created lazily
//! - TTL expiry is the only deletion mechanism for presence, lockout and
//!   pending-enrollment keys
//! - There are no transactions; see the repository docs for the accepted
//!   lost-update window

pub mod keys;
pub mod kv;
pub mod memory;
pub mod redb_kv;
pub mod repository;
pub mod ring;

pub use kv::{
    read_json, write_json, KeyPage, KvStore, StoreError, StoreResult, SWEEP_INTERVAL,
};
pub use memory::MemoryKv;
pub use redb_kv::RedbKv;
pub use repository::{
    AnalyticsRepository, LockoutRepository, NewReclaim, StatsRepository, TotpRepository,
};
pub use ring::RingBuffer;
