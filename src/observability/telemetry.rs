//! Span pipeline.
//!
//! # Responsibilities
//! - Build the OpenTelemetry tracer provider for this service
//! - Ship finished spans to an OTLP/HTTP collector when export is enabled
//! - Bridge `tracing` spans into OpenTelemetry spans
//! - Flush queued spans on shutdown
//!
//! # Design Decisions
//! - The provider always exists, so trace IDs are generated and propagated even
//!   when nothing is exported
//! - Export goes through a `BatchSpanProcessor`: bounded queue, background
//!   worker, failures logged by the SDK and never surfaced to requests
//! - Only this crate's spans become OpenTelemetry spans; library spans and the
//!   log level filter do not change the trace tree

use std::time::Duration;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::config::TracingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build span exporter for {endpoint}: {source}")]
    Exporter {
        endpoint: String,
        source: ExporterBuildError,
    },
}

/// Owns the tracer provider for the life of the process.
pub struct Telemetry {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl Telemetry {
    /// Build the provider described by `config`.
    pub fn from_config(service: &str, config: &TracingConfig) -> Result<Self, TelemetryError> {
        let resource = Resource::builder().with_service_name(service.to_string()).build();
        let mut builder = SdkTracerProvider::builder().with_resource(resource);

        if config.enabled {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(config.collector_endpoint.clone())
                .with_timeout(Duration::from_secs(config.export_timeout_secs))
                .build()
                .map_err(|source| TelemetryError::Exporter {
                    endpoint: config.collector_endpoint.clone(),
                    source,
                })?;

            let processor = BatchSpanProcessor::builder(exporter)
                .with_batch_config(
                    BatchConfigBuilder::default()
                        .with_max_queue_size(config.queue_capacity)
                        .with_max_export_batch_size(config.batch_size)
                        .build(),
                )
                .build();
            builder = builder.with_span_processor(processor);

            tracing::debug!(endpoint = %config.collector_endpoint, "OTLP span export enabled");
        }

        Ok(Self::from_provider(service, builder.build()))
    }

    /// Wrap an already configured provider.
    pub fn from_provider(service: &str, provider: SdkTracerProvider) -> Self {
        let tracer = provider.tracer(service.to_string());
        Self { provider, tracer }
    }

    /// `tracing` layer that turns this crate's spans into OpenTelemetry spans.
    pub fn layer<S>(&self) -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_opentelemetry::layer()
            .with_tracer(self.tracer.clone())
            .with_filter(Targets::new().with_target(env!("CARGO_CRATE_NAME"), Level::INFO))
    }

    /// Export whatever is still queued and stop the provider.
    pub async fn shutdown(self) {
        let provider = self.provider;
        match tokio::task::spawn_blocking(move || provider.shutdown()).await {
            Ok(Ok(())) => tracing::info!("Span exporter flushed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Span exporter shutdown failed"),
            Err(e) => tracing::warn!(error = %e, "Span exporter shutdown task failed"),
        }
    }
}
