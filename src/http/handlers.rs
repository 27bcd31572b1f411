//! Route handlers.

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{field, Instrument};

use crate::http::request::{ensure_correlation_id, CorrelationId};
use crate::http::server::AppState;

/// Body of `GET /`.
pub const HOME_MESSAGE: &str = "Observability check: 👌";

/// Prometheus text exposition content type.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Serialize)]
struct HomeResponse<'a> {
    message: &'a str,
}

/// `GET /`: optional downstream call, artificial latency, static JSON body.
pub async fn home(State(state): State<AppState>, mut request: Request) -> Response {
    let correlation_id = match request.extensions().get::<CorrelationId>() {
        Some(id) => id.clone(),
        None => ensure_correlation_id(&mut request),
    };

    let span = tracing::info_span!(
        "home",
        otel.status_code = field::Empty,
        downstream.status_code = field::Empty,
    );

    async move {
        if let Some(forwarder) = &state.forwarder {
            // Failure is already logged and traced; the response does not depend on it.
            if let Ok(reply) = forwarder.call(&correlation_id).await {
                tracing::Span::current().record("downstream.status_code", reply.status);
            }
        }

        state.latency.inject().await;

        let body = match serde_json::to_vec(&HomeResponse { message: HOME_MESSAGE }) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "can't marshal json");
                Vec::new()
            }
        };

        tracing::info!("writing response with status: {}", StatusCode::OK.as_u16());
        tracing::Span::current().record("otel.status_code", "ok");

        (StatusCode::OK, [(CONTENT_TYPE, "application/json")], body).into_response()
    }
    .instrument(span)
    .await
}

/// `GET /metrics`: Prometheus exposition of the HTTP metrics.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], state.metrics.render())
}
