//! sl-server: HTTP API server and job lifecycle management.
//!
//! This crate ties the other sl-* crates into a running service. It provides:
//!
//! - Axum-based HTTP API for submitting conversions and polling jobs
//! - Concurrent in-memory job registry with a strict state machine
//! - Bounded worker pool executing conversions in the background
//! - TTL-based retention sweep for finished jobs and their temp files
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod pool;
pub mod retention;
pub mod router;
pub mod routes;
pub mod service;
pub mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sl_core::config::Config;
use sl_core::events::EventBus;

use crate::context::AppContext;
use crate::service::ConversionService;
use crate::store::JobStore;

/// Start the staffline server.
///
/// This is the main entry point. It prepares the temp directory, selects the
/// recognition engine, constructs the [`AppContext`], and runs the HTTP
/// server plus the retention sweeper. Returns when a shutdown signal is
/// received, after draining in-flight conversions.
pub async fn start(config: Config) -> sl_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    // Working directory for uploaded documents and artifacts.
    let temp_dir = config.server.resolve_temp_dir();
    std::fs::create_dir_all(&temp_dir)?;
    tracing::info!("Job files under {}", temp_dir.display());

    // Recognition engine: Audiveris when installed, stub otherwise.
    let engine = sl_omr::select_engine(&config.engine);

    let store = Arc::new(JobStore::new());
    let event_bus = Arc::new(EventBus::default());
    let service = Arc::new(ConversionService::new(
        store.clone(),
        engine,
        event_bus.clone(),
        temp_dir,
        config.workers.count,
        Duration::from_secs(config.engine.timeout_secs),
    ));

    let ctx = AppContext {
        config: Arc::new(config.clone()),
        store: store.clone(),
        service: service.clone(),
        event_bus,
    };

    // Cancellation token for graceful shutdown.
    let cancel = CancellationToken::new();

    // Spawn the retention sweeper.
    let sweeper_handle = tokio::spawn(retention::run_sweeper(
        store,
        config.retention.clone(),
        cancel.clone(),
    ));

    // Build and start the HTTP server.
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sl_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| sl_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .map_err(|e| sl_core::Error::Internal(format!("Server error: {e}")))?;

    // Stop accepting work and let running conversions finish.
    cancel.cancel();
    tracing::info!("Draining in-flight conversions");
    service.shutdown().await;
    let _ = sweeper_handle.await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        // Verify that all the types compose correctly (compile-time check).
        let _config = Config::default();
    }
}
