// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SolKit API - edge backend for the SolKit Solana tools site
//!
//! Aggregates rent-reclaim statistics, ingests anonymous analytics, proxies
//! allow-listed Solana JSON-RPC calls and serves the admin dashboard behind
//! a bearer token with optional TOTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers, router and middleware (Axum)
//! - `auth` - Admin authentication, lockout and client IP resolution
//! - `rpc` - JSON-RPC allow-list and upstream proxy
//! - `storage` - Key-value store abstraction and repositories
//! - `totp` - RFC 6238 one-time passwords

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod ratelimit;
pub mod rpc;
pub mod state;
pub mod storage;
pub mod totp;
