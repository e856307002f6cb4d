//! Health classification.
//!
//! # Rules (first match wins)
//! ```text
//! total_checks == 0                          → Unknown
//! consecutive_failures >= failover_threshold → Unhealthy
//! success_rate < degraded_success_rate       → Degraded
//! otherwise                                  → Healthy
//! ```
//!
//! A provider that is both failing repeatedly and below the success-rate
//! floor is Unhealthy, never Degraded.

use crate::config::HealthConfig;
use crate::health::types::{HealthAggregate, HealthStatus};

/// Classify an aggregate. Pure; depends only on its inputs.
pub fn evaluate(aggregate: &HealthAggregate, failover_threshold: u32, degraded_success_rate: f64) -> HealthStatus {
    if aggregate.total_checks == 0 {
        HealthStatus::Unknown
    } else if aggregate.consecutive_failures >= failover_threshold {
        HealthStatus::Unhealthy
    } else if aggregate.success_rate < degraded_success_rate {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

/// Evaluator bound to configured thresholds.
#[derive(Debug, Clone, Copy)]
pub struct HealthEvaluator {
    pub failover_threshold: u32,
    pub degraded_success_rate: f64,
}

impl HealthEvaluator {
    pub fn new(failover_threshold: u32, degraded_success_rate: f64) -> Self {
        Self {
            failover_threshold,
            degraded_success_rate,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.failover_threshold, config.degraded_success_rate)
    }

    pub fn evaluate(&self, aggregate: &HealthAggregate) -> HealthStatus {
        evaluate(aggregate, self.failover_threshold, self.degraded_success_rate)
    }
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::from_config(&HealthConfig::default())
    }
}
