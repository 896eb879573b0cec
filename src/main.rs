// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use solkit_api::{
    api::router,
    clock::{Clock, SystemClock},
    config::{AppConfig, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{KvStore, MemoryKv, RedbKv},
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

fn open_store(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Arc<dyn KvStore>, String> {
    match &config.kv_path {
        Some(path) => {
            let store = RedbKv::open(path, clock)
                .map_err(|e| format!("failed to open store at {}: {e}", path.display()))?;
            info!(path = %path.display(), "Using redb store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("KV_PATH not set; data is kept in memory and lost on restart");
            Ok(Arc::new(MemoryKv::new(clock)))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::from_env();
    init_logging(&config);

    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set; admin endpoints will reject every request");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let kv = match open_store(&config, clock.clone()) {
        Ok(kv) => kv,
        Err(e) => {
            error!(error = %e, "Store initialization failed");
            return ExitCode::FAILURE;
        }
    };

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, host = %config.host, port = config.port, "Invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::new(config, kv, clock) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            return ExitCode::FAILURE;
        }
    };
    let rpc_configured = state.rpc.is_configured();
    let app = router(state);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, rpc_configured, "SolKit API listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, starting graceful shutdown");
}
