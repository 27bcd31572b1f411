//! Configuration loading from disk and the command line.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Resolve the startup configuration: file (or defaults), then flag overrides,
/// then validation.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };

    cli.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, RequestIdPropagation};

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
            app_name = "frontend"

            [downstream]
            url = "http://backend:4041/"
            request_id = "inherit"

            [logging]
            format = "text"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_name, "frontend");
        assert_eq!(config.listener.port, 4040);
        assert_eq!(config.downstream.timeout_secs, 10);
        assert_eq!(config.downstream.request_id, RequestIdPropagation::Inherit);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.latency.enabled);
    }

    fn cli_for(path: &Path) -> Cli {
        Cli {
            config: Some(path.to_path_buf()),
            ..Cli::default()
        }
    }

    #[test]
    fn test_file_config_reports_validation_errors() {
        let path = std::env::temp_dir().join(format!("obs-check-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "app_name = \"\"\n").unwrap();

        let err = resolve_config(&cli_for(&path)).unwrap_err();
        let _ = fs::remove_file(&path);

        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("app_name must not be empty"));
    }

    #[test]
    fn test_flags_override_file_before_validation() {
        let path = std::env::temp_dir().join(format!("obs-check-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "app_name = \"\"\n[listener]\nport = 5000\n").unwrap();

        let cli = Cli {
            app_name: Some("fixed".into()),
            ..cli_for(&path)
        };
        let config = resolve_config(&cli).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.app_name, "fixed");
        assert_eq!(config.listener.port, 5000);
    }

    #[test]
    fn test_missing_config_file() {
        let err = resolve_config(&cli_for(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let err = parse_config("[downstream]\nrequest_id = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
