// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::ratelimit::RateLimits;
use crate::rpc::{RpcError, RpcProxy};
use crate::storage::{KvStore, MemoryKv};

/// Shared handler state.
///
/// Everything is behind `Arc`, so cloning per request is cheap. The rate
/// limit tables are the only process-local mutable state; the store holds
/// everything that must survive a restart.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub clock: Arc<dyn Clock>,
    pub limits: Arc<RateLimits>,
    pub rpc: RpcProxy,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RpcError> {
        let rpc = RpcProxy::new(config.rpc_upstream_url.clone(), config.rpc_timeout)?;
        Ok(Self {
            kv,
            limits: Arc::new(RateLimits::new(clock.clone())),
            clock,
            rpc,
            config: Arc::new(config),
        })
    }

    /// In-memory store driven by `clock`. Used by tests and local runs.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self, RpcError> {
        let kv = Arc::new(MemoryKv::new(clock.clone()));
        Self::new(config, kv, clock)
    }

    /// In-memory store on the system clock.
    pub fn in_memory(config: AppConfig) -> Result<Self, RpcError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }
}
