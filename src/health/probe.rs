//! Single connectivity probe.
//!
//! # Responsibilities
//! - Resolve the provider through the directory
//! - Short-circuit missing or disabled providers without network I/O
//! - Build the client through the registry and time the call
//! - Encode every failure mode into the returned result

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time;

use crate::health::types::HealthCheckResult;
use crate::observability::metrics;
use crate::providers::{ProviderDirectory, ProviderRegistry};

pub const MSG_NOT_FOUND: &str = "Provider config not found";
pub const MSG_DISABLED: &str = "Provider is disabled";

/// Executes probes against configured providers.
#[derive(Clone)]
pub struct HealthProber {
    directory: Arc<dyn ProviderDirectory>,
    registry: Arc<ProviderRegistry>,
}

impl HealthProber {
    pub fn new(directory: Arc<dyn ProviderDirectory>, registry: Arc<ProviderRegistry>) -> Self {
        Self { directory, registry }
    }

    /// Probe one provider. Never fails; errors become failed results.
    pub async fn check_provider_health(&self, provider: &str) -> HealthCheckResult {
        let Some(config) = self.directory.get_provider(provider) else {
            tracing::debug!(provider = %provider, "Probe skipped: no configuration");
            return HealthCheckResult::failure(provider, 0.0, MSG_NOT_FOUND, None);
        };
        if !config.enabled {
            tracing::debug!(provider = %provider, "Probe skipped: provider disabled");
            return HealthCheckResult::failure(provider, 0.0, MSG_DISABLED, None);
        }

        let start = Instant::now();
        let outcome = match self.registry.build(&config) {
            Ok(client) => {
                let timeout = Duration::from_secs(config.timeout_secs);
                match time::timeout(timeout, client.test_connection()).await {
                    Ok(Ok(status_code)) => Ok(status_code),
                    Ok(Err(e)) => Err((e.to_string(), e.status_code())),
                    Err(_) => Err((format!("Health check timed out after {}s", config.timeout_secs), None)),
                }
            }
            Err(e) => Err((e.to_string(), None)),
        };
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = match outcome {
            Ok(status_code) => {
                tracing::debug!(provider = %provider, latency_ms, "Probe succeeded");
                HealthCheckResult::success(provider, latency_ms, status_code)
            }
            Err((message, status_code)) => {
                tracing::warn!(provider = %provider, latency_ms, error = %message, "Probe failed");
                HealthCheckResult::failure(provider, latency_ms, message, status_code)
            }
        };

        metrics::record_probe(provider, result.success, latency_ms);
        result
    }
}
