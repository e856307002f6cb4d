//! Health records and derived views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one connectivity probe. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub provider: String,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub status_code: Option<u16>,
}

impl HealthCheckResult {
    /// A successful probe observed now.
    pub fn success(provider: impl Into<String>, latency_ms: f64, status_code: Option<u16>) -> Self {
        Self {
            provider: provider.into(),
            timestamp: Utc::now(),
            latency_ms,
            success: true,
            error_message: None,
            status_code,
        }
    }

    /// A failed probe observed now.
    pub fn failure(
        provider: impl Into<String>,
        latency_ms: f64,
        error_message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            provider: provider.into(),
            timestamp: Utc::now(),
            latency_ms,
            success: false,
            error_message: Some(error_message.into()),
            status_code,
        }
    }

    /// Same result stamped at a different instant.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Health classification of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregates computed by the metrics store for one provider.
///
/// `total_checks`, `avg_latency_ms`, `p95_latency_ms` and `success_rate`
/// cover the requested window. The remaining fields come from the most
/// recent raw checks regardless of the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthAggregate {
    pub total_checks: u64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub success_rate: f64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
}

/// Derived health view of a provider. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub status: HealthStatus,
    pub latency_avg_ms: f64,
    pub latency_p95_ms: f64,
    pub success_rate: f64,
    pub total_checks: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub is_enabled: bool,
    pub failover_count: u64,
}

impl ProviderHealth {
    /// Assemble the view from an aggregate and controller state.
    pub fn from_aggregate(
        provider: impl Into<String>,
        status: HealthStatus,
        aggregate: HealthAggregate,
        is_enabled: bool,
        failover_count: u64,
    ) -> Self {
        Self {
            provider: provider.into(),
            status,
            latency_avg_ms: aggregate.avg_latency_ms,
            latency_p95_ms: aggregate.p95_latency_ms,
            success_rate: aggregate.success_rate,
            total_checks: aggregate.total_checks,
            consecutive_failures: aggregate.consecutive_failures,
            last_error: aggregate.last_error,
            last_check: aggregate.last_check,
            last_success: aggregate.last_success,
            is_enabled,
            failover_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
        assert_eq!(HealthStatus::Degraded.to_string(), "degraded");
    }

    #[test]
    fn test_failure_carries_message() {
        let result = HealthCheckResult::failure("openai", 0.0, "Provider is disabled", None);
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("Provider is disabled"));
    }
}
