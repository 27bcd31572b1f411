//! Observability check service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                   OBSERVABILITY CHECK                    │
//!                  │                                                          │
//!   Client ────────┼─▶ trace ──▶ metrics ──▶ correlation ──▶ handler          │
//!   Request        │   (span)    (timer,     (X-Request-ID)    │               │
//!                  │             status)                       │ optional      │
//!                  │                                           ▼               │
//!                  │                                     downstream call ──────┼──▶ Downstream
//!                  │                                     (child span,          │    Service
//!                  │                                      traceparent)         │
//!                  │                                                          │
//!                  │  ┌────────────────────────────────────────────────────┐  │
//!                  │  │ /metrics  ◀── MetricsRegistry (Prometheus text)    │  │
//!                  │  │ finished spans ──▶ OTLP batch ──▶ collector (opt.) │  │
//!                  │  │ structured logs ──▶ stdout / _logs/<app>.log       │  │
//!                  │  └────────────────────────────────────────────────────┘  │
//!                  └──────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;

use observability_check::config::{resolve_config, Cli};
use observability_check::lifecycle;
use observability_check::observability::logging::init_logging;
use observability_check::observability::Telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("observability-check: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Logging is not up yet, so these failures go to stderr.
    let telemetry = match Telemetry::from_config(&config.app_name, &config.tracing) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("observability-check: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config, &telemetry) {
        eprintln!("observability-check: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("observability-check v{} starting", env!("CARGO_PKG_VERSION"));

    let code = match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    };

    // Flush spans still queued for the collector.
    telemetry.shutdown().await;
    tracing::info!("Shutdown complete");
    code
}
