//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the metrics registry and downstream forwarder
//! - Assemble application state
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener is bound last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::downstream::ForwardError;
use crate::http::{AppServer, AppState};
use crate::lifecycle::Shutdown;
use crate::observability::MetricsRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("metrics registry: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("downstream: {0}")]
    Downstream(#[from] ForwardError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Build every subsystem from `config`, then serve until terminated.
/// Logging and span export must already be initialized; the caller owns
/// their shutdown.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!(
        app = %config.app_name,
        port = config.listener.port,
        downstream = %config.downstream.url,
        tracing_enabled = config.tracing.enabled,
        "Configuration loaded"
    );

    let metrics = MetricsRegistry::new(config.app_name.clone())?;

    let address = config.listener.bind_address();
    let state = AppState::new(config, metrics)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    AppServer::new(state)
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
