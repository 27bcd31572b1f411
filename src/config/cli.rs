//! Command-line flags.
//!
//! Flags mirror the short options operators already use (`-n`, `-p`, `-d`) and
//! override whatever the optional config file sets.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{AppConfig, LogFormat};

#[derive(Debug, Default, Parser)]
#[command(name = "observability-check")]
#[command(about = "HTTP service instrumented with request IDs, traces and metrics", long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Application name.
    #[arg(short = 'n', long = "name")]
    pub app_name: Option<String>,

    /// Application port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Downstream URL. An empty string disables the downstream call.
    #[arg(short, long)]
    pub downstream: Option<String>,

    /// OTLP/HTTP traces endpoint. Setting it enables span export.
    #[arg(long)]
    pub collector: Option<String>,

    /// Log format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogFormatArg {
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(name) = &self.app_name {
            config.app_name = name.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = &self.downstream {
            config.downstream.url = url.clone();
        }
        if let Some(endpoint) = &self.collector {
            config.tracing.collector_endpoint = endpoint.clone();
            config.tracing.enabled = true;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format.into();
        }
    }
}
