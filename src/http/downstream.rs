//! Downstream forwarding.
//!
//! # Responsibilities
//! - Issue a GET to the configured downstream service
//! - Open a child span for the call and propagate it as `traceparent`
//! - Attach a correlation ID (fresh or inherited, per config)
//!
//! # Design Decisions
//! - Every call has a deadline (`downstream.timeout_secs`)
//! - No retries; a failure is logged and reported to the caller, who carries on
//! - The span is closed on both the success and the error path

use std::time::Duration;

use reqwest::header::{HeaderMap, USER_AGENT};
use thiserror::Error;
use tracing::{field, Instrument};
use url::Url;

use crate::config::{DownstreamConfig, RequestIdPropagation};
use crate::http::request::{CorrelationId, X_REQUEST_ID};
use crate::observability::trace::{inject_context, record_trace_ids};

/// User agent sent on downstream calls.
pub const DOWNSTREAM_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid downstream url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to build downstream client: {0}")]
    Client(reqwest::Error),

    #[error("error calling downstream service: {0}")]
    Request(reqwest::Error),
}

/// What the downstream service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamReply {
    pub status: u16,
    /// `X-Request-ID` we sent.
    pub sent_request_id: CorrelationId,
    /// `X-Request-ID` the downstream returned, if any.
    pub returned_request_id: Option<String>,
}

/// Issues the traced, correlated downstream call.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    url: Url,
    request_id: RequestIdPropagation,
}

impl Forwarder {
    pub fn new(config: &DownstreamConfig) -> Result<Self, ForwardError> {
        let url = Url::parse(config.url.trim()).map_err(|source| ForwardError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            url,
            request_id: config.request_id,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn outbound_request_id(&self, inbound: &CorrelationId) -> CorrelationId {
        match self.request_id {
            RequestIdPropagation::Fresh => CorrelationId::generate(),
            RequestIdPropagation::Inherit => inbound.clone(),
        }
    }

    /// Call the downstream service inside a `call_downstream` span, a child of
    /// the current span. The span closes on both the success and error path.
    pub async fn call(&self, correlation_id: &CorrelationId) -> Result<DownstreamReply, ForwardError> {
        let span = tracing::info_span!(
            "call_downstream",
            otel.kind = "client",
            otel.status_code = field::Empty,
            http.method = "GET",
            http.url = %self.url,
            http.status_code = field::Empty,
            trace_id = field::Empty,
            span_id = field::Empty,
        );
        record_trace_ids(&span);

        self.send(&span, correlation_id).instrument(span.clone()).await
    }

    async fn send(
        &self,
        span: &tracing::Span,
        correlation_id: &CorrelationId,
    ) -> Result<DownstreamReply, ForwardError> {
        let sent_request_id = self.outbound_request_id(correlation_id);

        let mut headers = HeaderMap::new();
        inject_context(span, &mut headers);

        tracing::info!(
            downstream_request_id = %sent_request_id,
            "calling downstream service: {}",
            self.url
        );

        let result = self
            .client
            .get(self.url.clone())
            .headers(headers)
            .header(USER_AGENT, DOWNSTREAM_USER_AGENT)
            .header(X_REQUEST_ID, sent_request_id.as_str())
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                let returned_request_id = response
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);

                tracing::info!("downstream service returned http code: {}", status.as_u16());
                tracing::info!(
                    "downstream service returned request id: {}",
                    returned_request_id.as_deref().unwrap_or("")
                );

                span.record("http.status_code", status.as_u16());
                span.record("otel.status_code", if status.is_server_error() { "error" } else { "ok" });

                Ok(DownstreamReply {
                    status: status.as_u16(),
                    sent_request_id,
                    returned_request_id,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "error calling downstream service");
                span.record("otel.status_code", "error");
                Err(ForwardError::Request(e))
            }
        }
    }
}
