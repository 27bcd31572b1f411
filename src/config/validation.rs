//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that would only fail once
//! the service is running (unparseable URLs, zero timeouts, empty labels).
//! All problems are collected so a bad config is reported in one pass.

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app_name must not be empty")]
    EmptyAppName,

    #[error("downstream.url '{url}' is invalid: {reason}")]
    InvalidDownstreamUrl { url: String, reason: String },

    #[error("downstream.timeout_secs must be greater than zero")]
    ZeroDownstreamTimeout,

    #[error("tracing.collector_endpoint '{url}' is invalid: {reason}")]
    InvalidCollectorEndpoint { url: String, reason: String },

    #[error("tracing.{field} must be greater than zero")]
    ZeroTracingSetting { field: &'static str },

    #[error("logging.level '{0}' is not a valid log level")]
    InvalidLogLevel(String),
}

/// Validate the configuration, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app_name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }

    if config.downstream.is_enabled() {
        if let Err(reason) = check_http_url(&config.downstream.url) {
            errors.push(ValidationError::InvalidDownstreamUrl {
                url: config.downstream.url.clone(),
                reason,
            });
        }
        if config.downstream.timeout_secs == 0 {
            errors.push(ValidationError::ZeroDownstreamTimeout);
        }
    }

    if config.tracing.enabled {
        if let Err(reason) = check_http_url(&config.tracing.collector_endpoint) {
            errors.push(ValidationError::InvalidCollectorEndpoint {
                url: config.tracing.collector_endpoint.clone(),
                reason,
            });
        }
        if config.tracing.batch_size == 0 {
            errors.push(ValidationError::ZeroTracingSetting { field: "batch_size" });
        }
        if config.tracing.queue_capacity == 0 {
            errors.push(ValidationError::ZeroTracingSetting { field: "queue_capacity" });
        }
        if config.tracing.export_timeout_secs == 0 {
            errors.push(ValidationError::ZeroTracingSetting { field: "export_timeout_secs" });
        }
    }

    if config
        .logging
        .level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .is_err()
    {
        errors.push(ValidationError::InvalidLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.app_name = "  ".into();
        config.downstream.url = "not a url".into();
        config.downstream.timeout_secs = 0;
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyAppName));
        assert!(errors.contains(&ValidationError::ZeroDownstreamTimeout));
        assert!(errors.contains(&ValidationError::InvalidLogLevel("loud".into())));
    }

    #[test]
    fn test_disabled_downstream_skips_url_checks() {
        let mut config = AppConfig::default();
        config.downstream.url = String::new();
        config.downstream.timeout_secs = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collector_endpoint_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.tracing.collector_endpoint = "ftp://collector".into();
        assert!(validate_config(&config).is_ok());

        config.tracing.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidCollectorEndpoint { .. }]
        ));
    }
}
