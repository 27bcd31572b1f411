//! Request correlation.
//!
//! # Responsibilities
//! - Read the caller's `X-Request-ID`
//! - Generate one (UUID v4) when it is missing or empty
//! - Write it back into the request so every later stage sees the same value
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A missing ID is not an error; it is generated and a warning is logged

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, Request};
use uuid::Uuid;

/// Correlation header name.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Opaque per-request correlation identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// A new globally-unique identifier.
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }

    /// Read a usable ID from `headers`, if one is present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self(Arc::from(v)))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return the request's correlation ID, generating and storing one if the
/// client did not supply it.
pub fn ensure_correlation_id<B>(request: &mut Request<B>) -> CorrelationId {
    if let Some(id) = CorrelationId::from_headers(request.headers()) {
        return id;
    }

    let id = CorrelationId::generate();
    if let Some(value) = id.to_header_value() {
        request.headers_mut().insert(X_REQUEST_ID, value);
    }
    tracing::warn!(
        request_id = %id,
        "header {} is empty, no request id has been provided",
        X_REQUEST_ID
    );
    id
}
