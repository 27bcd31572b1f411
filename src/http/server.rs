//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up the observability pipeline in its fixed order
//! - Bind server to listener and serve until shutdown

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::AppConfig;
use crate::http::downstream::{ForwardError, Forwarder};
use crate::http::handlers;
use crate::http::latency::LatencyInjector;
use crate::http::middleware::{correlation_middleware, metrics_middleware, trace_middleware};
use crate::observability::MetricsRegistry;

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: MetricsRegistry,
    pub forwarder: Option<Arc<Forwarder>>,
    pub latency: LatencyInjector,
}

impl AppState {
    /// Assemble state from startup-built collaborators. The forwarder is created
    /// only when a downstream URL is configured.
    pub fn new(config: AppConfig, metrics: MetricsRegistry) -> Result<Self, ForwardError> {
        let forwarder = if config.downstream.is_enabled() {
            Some(Arc::new(Forwarder::new(&config.downstream)?))
        } else {
            None
        };
        let latency = LatencyInjector::from_config(&config.latency);

        Ok(Self {
            config: Arc::new(config),
            metrics,
            forwarder,
            latency,
        })
    }
}

/// HTTP server for the service.
pub struct AppServer {
    router: Router,
    state: AppState,
}

impl AppServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the service router: application routes behind the pipeline.
    pub fn build_router(state: AppState) -> Router {
        let routes = Router::new()
            .route("/", get(handlers::home))
            .route("/metrics", get(handlers::metrics))
            .with_state(state.clone());
        Self::with_pipeline(routes, state)
    }

    /// Wrap `routes` (fallback included) in the observability pipeline.
    /// Layers listed first in the `ServiceBuilder` run first.
    pub fn with_pipeline(routes: Router, state: AppState) -> Router {
        let pipeline = ServiceBuilder::new()
            .layer(from_fn_with_state(state.clone(), trace_middleware))
            .layer(from_fn_with_state(state, metrics_middleware))
            .layer(from_fn(correlation_middleware))
            .layer(CatchPanicLayer::new());

        routes.layer(pipeline)
    }

    /// Serve on `listener` until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app = %self.state.config.app_name,
            downstream = self.state.forwarder.as_ref().map(|f| f.url().as_str()).unwrap_or(""),
            "starting observability app"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
