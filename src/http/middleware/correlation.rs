//! Correlation ID middleware.
//!
//! Ensures every request carries an `X-Request-ID`, makes it available to the
//! handler, stamps it on the enclosing request span, and echoes it on the
//! response.

use axum::{
    extract::Request,
    http::header::{HOST, USER_AGENT},
    middleware::Next,
    response::Response,
};

use crate::http::request::{ensure_correlation_id, X_REQUEST_ID};

pub async fn correlation_middleware(mut request: Request, next: Next) -> Response {
    let id = ensure_correlation_id(&mut request);
    tracing::Span::current().record("request_id", id.as_str());
    request.extensions_mut().insert(id.clone());

    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    tracing::info!("serving request: {} {}{}", request.method(), host, request.uri());
    tracing::debug!("user agent: {}", user_agent);

    let mut response = next.run(request).await;
    if let Some(value) = id.to_header_value() {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
