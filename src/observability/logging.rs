//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Route output to stdout or a per-app log file
//! - Attach the span layer next to the log output
//!
//! # Design Decisions
//! - JSON lines by default, human-readable text on request
//! - `RUST_LOG` overrides the configured level, for log output only
//! - An unwritable log file is a startup error

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{AppConfig, LogFormat, LogOutput, DEFAULT_APP_NAME};
use crate::observability::Telemetry;

const DEFAULT_LOG_FILE: &str = "observability.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log file {path} can't be created: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

/// Path of the log file for this app: `observability.log` for the default app
/// name, `<app_name>.log` otherwise.
pub fn log_file_path(config: &AppConfig) -> PathBuf {
    let file = if config.app_name == DEFAULT_APP_NAME {
        DEFAULT_LOG_FILE.to_string()
    } else {
        format!("{}.log", config.app_name)
    };
    PathBuf::from(&config.logging.directory).join(file)
}

/// Install the global subscriber described by `config.logging`, with
/// `telemetry`'s span layer alongside it.
pub fn init_logging(config: &AppConfig, telemetry: &Telemetry) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let (writer, ansi) = match config.logging.output {
        LogOutput::Stdout => (BoxMakeWriter::new(std::io::stdout), true),
        LogOutput::File => {
            let path = log_file_path(config);
            let file = open_log_file(&path).map_err(|source| LoggingError::LogFile { path, source })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let log_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(log_layer)
        .with(telemetry.layer())
        .try_init()
        .map_err(|e| LoggingError::Subscriber(e.to_string()))
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
