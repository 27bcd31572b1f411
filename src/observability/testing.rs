//! Span capture for unit tests.

use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

use crate::observability::Telemetry;

/// Routes this thread's spans into an in-memory exporter until dropped.
pub struct SpanCapture {
    exporter: InMemorySpanExporter,
    _guard: DefaultGuard,
}

impl SpanCapture {
    pub fn install() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let telemetry = Telemetry::from_provider("unit-test", provider);
        let subscriber = tracing_subscriber::registry().with(telemetry.layer());
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            exporter,
            _guard: guard,
        }
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap_or_default()
    }

    pub fn span(&self, name: &str) -> Option<SpanData> {
        self.spans().into_iter().find(|s| s.name == name)
    }
}
