//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "my-app";

/// Listen port used when none is configured.
pub const DEFAULT_APP_PORT: u16 = 4040;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used as the `app` metric label and in log lines.
    pub app_name: String,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Optional downstream service called from the home handler.
    pub downstream: DownstreamConfig,

    /// Span export settings.
    pub tracing: TracingConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Artificial latency added to the home handler.
    pub latency: LatencyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            listener: ListenerConfig::default(),
            downstream: DownstreamConfig::default(),
            tracing: TracingConfig::default(),
            logging: LoggingConfig::default(),
            latency: LatencyConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_APP_PORT,
        }
    }
}

/// Which `X-Request-ID` the forwarder attaches to the downstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestIdPropagation {
    /// Attach a newly generated ID, letting downstream see a distinct value.
    #[default]
    Fresh,
    /// Attach the inbound request's correlation ID unchanged.
    Inherit,
}

/// Downstream call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// Downstream URL. Empty string disables the call.
    pub url: String,

    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Correlation ID handling for the outbound request.
    pub request_id: RequestIdPropagation,
}

impl DownstreamConfig {
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 10,
            request_id: RequestIdPropagation::Fresh,
        }
    }
}

/// Span export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Export finished spans to the collector. When disabled spans are still
    /// created and propagated, just not shipped anywhere.
    pub enabled: bool,

    /// OTLP/HTTP traces endpoint, used as given (include `/v1/traces`).
    pub collector_endpoint: String,

    /// Maximum number of spans per export request.
    pub batch_size: usize,

    /// Spans buffered before new ones are dropped.
    pub queue_capacity: usize,

    /// Timeout for a single export request in seconds.
    pub export_timeout_secs: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            collector_endpoint: "http://localhost:4318/v1/traces".to_string(),
            batch_size: 512,
            queue_capacity: 2048,
            export_timeout_secs: 5,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    pub format: LogFormat,

    pub output: LogOutput,

    /// Directory holding the log file when `output = "file"`.
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            directory: "_logs".to_string(),
        }
    }
}

/// Artificial latency configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub enabled: bool,

    /// Upper bound (exclusive) of the random delay in milliseconds.
    pub max_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_ms: 1000,
        }
    }
}
