//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check provider names are unique and non-empty
//! - Validate value ranges (timeouts > 0, rates within [0, 1])
//! - Validate URLs and bind addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MonitorConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("provider at index {0} has an empty name")]
    EmptyProviderName(usize),

    #[error("duplicate provider name '{0}'")]
    DuplicateProvider(String),

    #[error("provider '{0}' has an invalid base_url: {1}")]
    InvalidBaseUrl(String, String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("health.degraded_success_rate must be within [0, 1], got {0}")]
    SuccessRateOutOfRange(f64),

    #[error("alerts.webhook_url is invalid: {0}")]
    InvalidWebhookUrl(String),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: String, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, provider) in config.providers.iter().enumerate() {
        if provider.name.trim().is_empty() {
            errors.push(ValidationError::EmptyProviderName(i));
            continue;
        }
        if !seen.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }
        if let Some(base_url) = &provider.base_url {
            if let Err(e) = url::Url::parse(base_url) {
                errors.push(ValidationError::InvalidBaseUrl(provider.name.clone(), e.to_string()));
            }
        }
        if provider.timeout_secs == 0 {
            errors.push(ValidationError::NotPositive {
                field: format!("providers.{}.timeout_secs", provider.name),
            });
        }
    }

    let health = &config.health;
    let positive = [
        ("health.check_interval_secs", health.check_interval_secs),
        ("health.failover_threshold", health.failover_threshold as u64),
        ("health.window_hours", health.window_hours as u64),
        ("health.failure_lookback", health.failure_lookback as u64),
        ("health.error_retry_secs", health.error_retry_secs),
        ("alerts.webhook_timeout_secs", config.alerts.webhook_timeout_secs),
        ("storage.pool_size", config.storage.pool_size as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NotPositive { field: field.to_string() });
        }
    }

    if !(0.0..=1.0).contains(&health.degraded_success_rate) {
        errors.push(ValidationError::SuccessRateOutOfRange(health.degraded_success_rate));
    }

    if let Some(webhook) = &config.alerts.webhook_url {
        if let Err(e) = url::Url::parse(webhook) {
            errors.push(ValidationError::InvalidWebhookUrl(e.to_string()));
        }
    }

    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ProviderConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MonitorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MonitorConfig::default();
        config.providers.push(ProviderConfig::new("openai", "openai"));
        config.providers.push(ProviderConfig::new("openai", "openai"));
        config.providers.push(ProviderConfig::new("", "gemini"));
        config.health.failover_threshold = 0;
        config.health.degraded_success_rate = 1.5;
        config.alerts.webhook_url = Some("not a url".into());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateProvider("openai".into())));
        assert!(errors.contains(&ValidationError::EmptyProviderName(2)));
        assert!(errors.contains(&ValidationError::NotPositive {
            field: "health.failover_threshold".into()
        }));
        assert!(errors.contains(&ValidationError::SuccessRateOutOfRange(1.5)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidWebhookUrl(_))));
    }

    #[test]
    fn test_admin_address_checked_only_when_enabled() {
        let mut config = MonitorConfig::default();
        config.admin.bind_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.admin.enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
