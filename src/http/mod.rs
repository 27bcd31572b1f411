//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware order)
//!     → middleware/ (trace → metrics → correlation)
//!     → handlers.rs (home, metrics)
//!         → downstream.rs (optional traced call)
//!         → latency.rs (artificial delay)
//!     → response.rs (status capture, metric sample)
//!     → Send to client
//! ```

pub mod downstream;
pub mod handlers;
pub mod latency;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ensure_correlation_id, CorrelationId, X_REQUEST_ID};
pub use server::{AppServer, AppState};
