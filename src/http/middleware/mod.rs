//! Request observability pipeline.
//!
//! # Order (outermost to innermost)
//! ```text
//! trace.rs        → continue/start trace, open server span
//!   metrics.rs    → time request, capture status, record sample
//!     correlation.rs → ensure X-Request-ID, scope logs, echo header
//!       catch-panic → turn handler panics into 500 responses
//!         handler
//! ```
//!
//! # Design Decisions
//! - The order is fixed in `server.rs`; each stage calls the next exactly once
//! - Trace context exists before any request-scoped log line is written
//! - Outer bookkeeping (span close, metric sample) runs on every exit path

pub mod correlation;
pub mod metrics;
pub mod trace;

pub use correlation::correlation_middleware;
pub use metrics::metrics_middleware;
pub use trace::trace_middleware;
