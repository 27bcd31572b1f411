//! Trace propagation middleware.
//!
//! Continues the caller's trace when a valid `traceparent` arrives, otherwise
//! starts a new one. The server span wraps every inner stage, so all request
//! log lines nest under it and carry its `request_id`, `trace_id` and
//! `span_id` fields. The span is closed before the middleware returns.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{field, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::http::request::CorrelationId;
use crate::http::server::AppState;
use crate::observability::trace::{extract_remote_context, record_trace_ids};

pub async fn trace_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        otel.name = %format!("{} {}", method, path),
        otel.kind = "server",
        otel.status_code = field::Empty,
        app = %state.config.app_name,
        http.method = %method,
        http.target = %path,
        http.status_code = field::Empty,
        request_id = field::Empty,
        trace_id = field::Empty,
        span_id = field::Empty,
    );

    // A client-supplied ID is known now; a generated one is recorded by the
    // correlation stage.
    if let Some(id) = CorrelationId::from_headers(request.headers()) {
        span.record("request_id", id.as_str());
    }

    if let Some(upstream) = span.in_scope(|| extract_remote_context(request.headers())) {
        let _ = span.set_parent(upstream);
    }
    record_trace_ids(&span);

    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("http.status_code", status.as_u16());
    span.record("otel.status_code", if status.is_server_error() { "error" } else { "ok" });

    response
}
