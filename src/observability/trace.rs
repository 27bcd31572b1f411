//! Trace propagation.
//!
//! # Responsibilities
//! - Continue the caller's trace from a W3C `traceparent` header
//! - Write the active span's context into outbound headers
//! - Stamp trace and span IDs onto `tracing` spans so log lines carry them
//!
//! # Design Decisions
//! - Request spans are plain `tracing` spans; the telemetry layer mirrors them
//!   as OpenTelemetry spans, which close exactly once when the last handle drops
//! - A malformed header is not an error: it is logged and a new trace starts

use axum::http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::TraceContextExt;
use opentelemetry::Context;
use opentelemetry_http::{HeaderExtractor, HeaderInjector};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::field;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C trace context header.
pub const TRACEPARENT: &str = "traceparent";

/// Read the upstream trace context. Absent or malformed headers yield `None`;
/// a malformed one is logged.
pub fn extract_remote_context(headers: &HeaderMap) -> Option<Context> {
    let raw = headers.get(TRACEPARENT)?;
    let cx = TraceContextPropagator::new().extract(&HeaderExtractor(headers));

    if cx.span().span_context().is_valid() {
        Some(cx)
    } else {
        tracing::warn!(
            header = TRACEPARENT,
            value = ?raw,
            "Malformed trace header, starting a new trace"
        );
        None
    }
}

/// Write `span`'s trace context into `headers`.
pub fn inject_context(span: &tracing::Span, headers: &mut HeaderMap) {
    let cx = span.context();
    TraceContextPropagator::new().inject_context(&cx, &mut HeaderInjector(headers));
}

/// Record `trace_id` and `span_id` on `span`. Both fields must be declared
/// (usually as `Empty`) when the span is created.
pub fn record_trace_ids(span: &tracing::Span) {
    let cx = span.context();
    let otel_span = cx.span();
    let ids = otel_span.span_context();
    if ids.is_valid() {
        span.record("trace_id", field::display(ids.trace_id()));
        span.record("span_id", field::display(ids.span_id()));
    }
}
