//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
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
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file does not exist.
pub fn load_config_or_default(path: &Path) -> Result<MonitorConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = ?path, "Config file not found, using defaults");
        return Ok(MonitorConfig::default());
    }
    load_config(path)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(
            &path,
            r#"
            [health]
            check_interval_secs = 60

            [[providers]]
            name = "deepseek"
            kind = "deepseek"
            enabled = false
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.health.check_interval_secs, 60);
        assert!(!config.providers[0].enabled);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_validation_error_is_reported() {
        let err = parse_config("[health]\nfailover_threshold = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("failover_threshold"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = parse_config("[health\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
