//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the HTTP metrics recorded once per request
//! - Render them in Prometheus text exposition format for `/metrics`
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, path, app
//! - `http_response_status` (counter): responses by status, app
//! - `http_response_time_seconds` (histogram): latency by method, path, app
//!
//! # Design Decisions
//! - The registry is an explicit object built at startup and carried in
//!   `AppState`; no global recorder is installed
//! - Updates are atomic inside the Prometheus recorder, so concurrent requests
//!   need no extra locking
//! - Histogram buckets are the Prometheus client defaults

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSE_STATUS: &str = "http_response_status";
pub const HTTP_RESPONSE_TIME_SECONDS: &str = "http_response_time_seconds";

/// Default Prometheus latency buckets, in seconds.
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// One completed request, as seen by the metrics recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub duration: Duration,
}

/// Process-wide HTTP metric aggregates.
#[derive(Clone)]
pub struct MetricsRegistry {
    app: Arc<str>,
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    pub fn new(app: impl Into<String>) -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(LATENCY_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(HTTP_REQUESTS_TOTAL, "Number of http requests.");
            describe_counter!(HTTP_RESPONSE_STATUS, "Status of http response");
            describe_histogram!(HTTP_RESPONSE_TIME_SECONDS, "Duration of http requests.");
        });

        Ok(Self {
            app: Arc::from(app.into()),
            recorder: Arc::new(recorder),
            handle,
        })
    }

    /// Record one request into all three aggregates.
    pub fn record(&self, sample: &MetricSample) {
        let app = self.app.to_string();
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            histogram!(
                HTTP_RESPONSE_TIME_SECONDS,
                "method" => sample.method.clone(),
                "path" => sample.path.clone(),
                "app" => app.clone()
            )
            .record(sample.duration.as_secs_f64());
            counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => sample.method.clone(),
                "path" => sample.path.clone(),
                "app" => app.clone()
            )
            .increment(1);
            counter!(
                HTTP_RESPONSE_STATUS,
                "status" => sample.status.to_string(),
                "app" => app
            )
            .increment(1);
        });
    }

    /// Render all aggregates in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Read a single sample value out of exposition text. `labels` must all be
/// present on the line; other labels are ignored.
#[cfg(test)]
pub(crate) fn sample_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let (metric, label_set) = match series.split_once('{') {
                Some((metric, rest)) => (metric, rest.strip_suffix('}')?),
                None => (series, ""),
            };
            if metric != name {
                return None;
            }
            let parsed = parse_labels(label_set);
            let matches = labels
                .iter()
                .all(|(k, v)| parsed.iter().any(|(pk, pv)| pk == k && pv == v));
            if matches {
                value.parse().ok()
            } else {
                None
            }
        })
}

/// Split `a="1",b="x,y"` into pairs, honouring quotes and escapes.
#[cfg(test)]
fn parse_labels(mut rest: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    while let Some((key, after)) = rest.split_once("=\"") {
        let mut value = String::new();
        let mut end = after.len();
        let mut chars = after.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(if escaped == 'n' { '\n' } else { escaped });
                    }
                }
                '"' => {
                    end = i + 1;
                    break;
                }
                _ => value.push(c),
            }
        }
        pairs.push((key.trim_start_matches(',').trim().to_string(), value));
        rest = &after[end..];
    }
    pairs
}
