//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the provider monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Provider definitions.
    pub providers: Vec<ProviderConfig>,

    /// Health check and failover settings.
    pub health: HealthConfig,

    /// Alert dispatch settings.
    pub alerts: AlertConfig,

    /// Durable store settings.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

impl MonitorConfig {
    /// Look up a provider definition by name.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// LLM provider definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier (e.g., "openai").
    pub name: String,

    /// Client kind used to build the connectivity probe.
    pub kind: String,

    /// Administrative switch; disabled providers are never probed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Override for the provider's API base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Probe timeout in seconds.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create an enabled provider with default settings.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            enabled: true,
            base_url: None,
            api_key_env: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_provider_timeout() -> u64 {
    30
}

/// Health check and failover configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Scheduler interval in seconds.
    pub check_interval_secs: u64,

    /// Consecutive failures before a provider is classified unhealthy.
    pub failover_threshold: u32,

    /// Success rate below which a provider is classified degraded.
    pub degraded_success_rate: f64,

    /// Aggregation window in hours.
    pub window_hours: u32,

    /// Number of most recent raw checks used for failure run-length.
    pub failure_lookback: u32,

    /// Sleep after a failed scheduler cycle, in seconds.
    pub error_retry_secs: u64,

    /// Maximum wait for the scheduler task on stop, in seconds.
    pub stop_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 300,
            failover_threshold: 3,
            degraded_success_rate: 0.8,
            window_hours: 24,
            failure_lookback: 10,
            error_retry_secs: 60,
            stop_timeout_secs: 10,
        }
    }
}

/// Alert dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Webhook receiving failover/recovery alerts.
    pub webhook_url: Option<String>,

    /// Webhook request timeout in seconds.
    pub webhook_timeout_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_secs: 10,
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: crate::storage::db::data_dir().join("health.sqlite"),
            pool_size: 8,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
