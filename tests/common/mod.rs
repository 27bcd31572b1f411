//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer};

use observability_check::config::AppConfig;
use observability_check::observability::{MetricsRegistry, Telemetry};
use observability_check::{AppServer, AppState, Shutdown};

/// Request ID the mock downstream answers with.
pub const DOWNSTREAM_RESPONSE_ID: &str = "downstream-generated-id";

/// A running service with a handle on its metrics.
pub struct TestApp {
    pub addr: SocketAddr,
    pub metrics: MetricsRegistry,
    pub shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service on an ephemeral port. Latency injection is off unless
/// `configure` turns it back on.
pub async fn spawn_app(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let mut config = AppConfig::default();
    config.app_name = "pipeline-test".into();
    config.latency.enabled = false;
    configure(&mut config);

    let metrics = MetricsRegistry::new(config.app_name.clone()).unwrap();
    let state = AppState::new(config, metrics.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = AppServer::new(state).run(listener, server_shutdown).await;
    });

    TestApp {
        addr,
        metrics,
        shutdown,
    }
}

/// Finished spans and JSON log lines of everything running on this test's
/// thread. Install before `spawn_app` so the server tasks inherit it.
pub struct Capture {
    exporter: InMemorySpanExporter,
    logs: CapturedLogs,
    _guard: DefaultGuard,
}

impl Capture {
    pub fn install() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let telemetry = Telemetry::from_provider("pipeline-test", provider);

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let log_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_filter(Targets::new().with_target("observability_check", Level::DEBUG));

        let subscriber = tracing_subscriber::registry()
            .with(log_layer)
            .with(telemetry.layer());
        let guard = tracing::subscriber::set_default(subscriber);

        Self {
            exporter,
            logs,
            _guard: guard,
        }
    }

    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn span(&self, name: &str) -> SpanData {
        self.spans()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no finished span named {}", name))
    }

    pub fn logs(&self) -> String {
        self.logs.contents()
    }
}

/// String value of attribute `key` on `span`.
pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.to_string())
}

/// Value of the first sample of `name` whose labels include every pair in
/// `labels`.
pub fn sample_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
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
            labels
                .iter()
                .all(|(k, v)| parsed.iter().any(|(pk, pv)| pk == k && pv == v))
                .then(|| value.parse().ok())
                .flatten()
        })
}

/// Number of distinct series exposed for `name`.
pub fn series_count(exposition: &str, name: &str) -> usize {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| line.split(['{', ' ']).next() == Some(name))
        .count()
}

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
                c => value.push(c),
            }
        }
        pairs.push((key.trim_start_matches(',').trim().to_string(), value));
        rest = &after[end..];
    }
    pairs
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Start a mock downstream that answers 200 and reports the headers of every
/// request it receives (names lowercased).
pub async fn start_recording_backend() -> (SocketAddr, mpsc::UnboundedReceiver<HashMap<String, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let _ = tx.send(parse_headers(&buf));

                        let body = "downstream ok";
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nX-Request-ID: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            DOWNSTREAM_RESPONSE_ID,
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a downstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

fn parse_headers(raw: &[u8]) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(raw);
    let head = text.split("\r\n\r\n").next().unwrap_or_default();
    head.lines()
        .skip(1)
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// In-memory log sink for asserting on log output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
