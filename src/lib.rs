//! Observability check service library.
//!
//! An HTTP service whose requests pass through a fixed observability pipeline:
//! trace propagation, metrics recording and request correlation, optionally
//! forwarding a traced call to a downstream service.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{AppServer, AppState};
pub use lifecycle::Shutdown;
