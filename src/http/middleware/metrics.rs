//! Metrics recording middleware.
//!
//! Times everything inside it (correlation and handler) and records one sample
//! per request through a `ResponseCapture` guard. The `path` label is the
//! matched route template, so unrouted traffic cannot grow the label set.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::response::ResponseCapture;
use crate::http::server::AppState;

/// `path` label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

pub async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    let mut capture = ResponseCapture::start(state.metrics.clone(), request.method().as_str(), path);

    let response = next.run(request).await;
    capture.capture(&response);

    response
}
