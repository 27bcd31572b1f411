//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → logging.rs (structured log events carrying request/trace IDs)
//!     → metrics.rs (one sample into counters and a histogram)
//!     → trace.rs (server span, handler span, downstream span)
//!
//! Consumers:
//!     → Log output (stdout or file)
//!     → /metrics endpoint (Prometheus scrape)
//!     → telemetry.rs → OTLP collector (best-effort)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through all log lines of a request
//! - Metrics are cheap (atomic increments)
//! - Span export never fails a request

pub mod logging;
pub mod metrics;
pub mod telemetry;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;

pub use metrics::{MetricSample, MetricsRegistry};
pub use telemetry::{Telemetry, TelemetryError};
pub use trace::TRACEPARENT;
