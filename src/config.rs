// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8787` |
//! | `ADMIN_TOKEN` | Bearer token for admin endpoints | Required for admin access |
//! | `RPC_UPSTREAM_URL` | Private Solana RPC endpoint | Required for `/api/rpc` |
//! | `RPC_TIMEOUT_SECS` | Upstream RPC timeout | `10` |
//! | `CORS_ALLOWED_ORIGIN` | Allowed CORS origin | `*` |
//! | `KV_PATH` | redb file for the persistent store | In-memory store |
//! | `CLIENT_IP_HEADER` | Trusted header carrying the client IP | `cf-connecting-ip` |
//! | `COUNTRY_HEADER` | Edge geolocation header | `cf-ipcountry` |
//! | `TOTP_ISSUER` | Issuer shown in authenticator apps | `SolKit` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, path::PathBuf, time::Duration};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";
pub const RPC_UPSTREAM_URL_ENV: &str = "RPC_UPSTREAM_URL";
pub const RPC_TIMEOUT_SECS_ENV: &str = "RPC_TIMEOUT_SECS";
pub const CORS_ALLOWED_ORIGIN_ENV: &str = "CORS_ALLOWED_ORIGIN";
/// Path of the redb database file. When unset the process keeps all
/// state in memory, which is only suitable for development.
pub const KV_PATH_ENV: &str = "KV_PATH";
pub const CLIENT_IP_HEADER_ENV: &str = "CLIENT_IP_HEADER";
pub const COUNTRY_HEADER_ENV: &str = "COUNTRY_HEADER";
pub const TOTP_ISSUER_ENV: &str = "TOTP_ISSUER";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CORS_ORIGIN: &str = "*";
pub const DEFAULT_CLIENT_IP_HEADER: &str = "cf-connecting-ip";
pub const DEFAULT_COUNTRY_HEADER: &str = "cf-ipcountry";
pub const DEFAULT_TOTP_ISSUER: &str = "SolKit";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` disables admin access entirely (every check fails).
    pub admin_token: Option<String>,
    pub rpc_upstream_url: Option<String>,
    pub rpc_timeout: Duration,
    pub cors_origin: String,
    pub kv_path: Option<PathBuf>,
    pub client_ip_header: String,
    pub country_header: String,
    pub totp_issuer: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin_token: None,
            rpc_upstream_url: None,
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            kv_path: None,
            client_ip_header: DEFAULT_CLIENT_IP_HEADER.to_string(),
            country_header: DEFAULT_COUNTRY_HEADER.to_string(),
            totp_issuer: DEFAULT_TOTP_ISSUER.to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env_or(HOST_ENV, defaults.host),
            port: env_non_empty(PORT_ENV)
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            admin_token: env_non_empty(ADMIN_TOKEN_ENV),
            rpc_upstream_url: env_non_empty(RPC_UPSTREAM_URL_ENV),
            rpc_timeout: env_non_empty(RPC_TIMEOUT_SECS_ENV)
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rpc_timeout),
            cors_origin: env_or(CORS_ALLOWED_ORIGIN_ENV, defaults.cors_origin),
            kv_path: env_non_empty(KV_PATH_ENV).map(PathBuf::from),
            client_ip_header: env_or(CLIENT_IP_HEADER_ENV, defaults.client_ip_header)
                .to_ascii_lowercase(),
            country_header: env_or(COUNTRY_HEADER_ENV, defaults.country_header)
                .to_ascii_lowercase(),
            totp_issuer: env_or(TOTP_ISSUER_ENV, defaults.totp_issuer),
            log_json: env_non_empty(LOG_FORMAT_ENV)
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Builder-style override used by tests and embedders.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn with_rpc_upstream(mut self, url: impl Into<String>) -> Self {
        self.rpc_upstream_url = Some(url.into());
        self
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: String) -> String {
    env_non_empty(name).unwrap_or(default)
}
