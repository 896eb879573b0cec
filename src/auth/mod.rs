// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Admin authentication for the dashboard endpoints.
//!
//! ## Auth Flow
//!
//! 1. The dashboard sends `Authorization: Bearer <ADMIN_TOKEN>` to
//!    `POST /api/admin/verify`, optionally with `{ "totp": "123456" }`
//! 2. The server:
//!    - refuses locked out or rate limited IPs with 429
//!    - compares the token in constant time
//!    - asks for a second factor (`403 {"totpRequired": true}`) when TOTP
//!      is enabled and no code was sent
//! 3. Subsequent reads send the same bearer token and are checked by the
//!    [`AdminBearer`] extractor
//!
//! ## Security
//!
//! - Each bad token or bad code increments `admin:blocked:<ip>` (TTL 1h);
//!   ten failures block the IP until the key expires
//! - Tokens and codes are never logged

pub mod client_ip;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod token;

pub use client_ip::{resolve_client_ip, ClientIp};
pub use error::AuthError;
pub use extractor::AdminBearer;
pub use gate::AdminGate;
