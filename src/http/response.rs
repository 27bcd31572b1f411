//! Response observation.
//!
//! # Responsibilities
//! - Capture the status code produced by the inner middleware chain
//! - Record exactly one metric sample per request, on every exit path
//!
//! # Design Decisions
//! - `ResponseCapture` is a guard: the sample is recorded in `Drop`, so an
//!   early return, an unwinding panic or a dropped request future all record
//! - The response itself is never touched; status and body pass through
//! - A request that ends without a response is recorded as 499

use std::time::Instant;

use axum::http::{Response, StatusCode};

use crate::observability::{MetricSample, MetricsRegistry};

/// Status recorded when the request future is dropped before producing a
/// response (client went away).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Times one request and records its metric sample when dropped.
pub struct ResponseCapture {
    registry: MetricsRegistry,
    method: String,
    path: String,
    started: Instant,
    status: Option<StatusCode>,
}

impl ResponseCapture {
    /// Start timing a request.
    pub fn start(registry: MetricsRegistry, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            registry,
            method: method.into(),
            path: path.into(),
            started: Instant::now(),
            status: None,
        }
    }

    /// Observe a response on its way out. The last observed status wins.
    pub fn capture<B>(&mut self, response: &Response<B>) {
        self.status = Some(response.status());
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl Drop for ResponseCapture {
    fn drop(&mut self) {
        let status = self
            .status
            .map(|s| s.as_u16())
            .unwrap_or(CLIENT_CLOSED_REQUEST);
        self.registry.record(&MetricSample {
            method: std::mem::take(&mut self.method),
            path: std::mem::take(&mut self.path),
            status,
            duration: self.started.elapsed(),
        });
    }
}
