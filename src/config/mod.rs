//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (flag overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc in AppState
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{resolve_config, ConfigError};
pub use schema::{
    AppConfig, DownstreamConfig, LatencyConfig, ListenerConfig, LogFormat, LogOutput,
    LoggingConfig, RequestIdPropagation, TracingConfig, DEFAULT_APP_NAME,
};
