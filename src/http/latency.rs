//! Artificial latency.
//!
//! Adds a uniformly random delay to the home handler so latency histograms
//! have something to show.

use std::time::Duration;

use rand::Rng;

use crate::config::LatencyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyInjector {
    max: Duration,
}

impl LatencyInjector {
    pub fn from_config(config: &LatencyConfig) -> Self {
        if config.enabled {
            Self {
                max: Duration::from_millis(config.max_ms),
            }
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self { max: Duration::ZERO }
    }

    /// Pick a delay in `[0, max)`.
    pub fn sample(&self) -> Duration {
        let max_ms = self.max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }

    /// Sleep for a sampled delay.
    pub async fn inject(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "Injecting latency");
            tokio::time::sleep(delay).await;
        }
    }
}
