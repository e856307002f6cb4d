//! Failover state machine.
//!
//! # States
//! - Enabled: provider receives traffic
//! - DisabledByFailover: provider excluded until it recovers
//!
//! # State Transitions
//! ```text
//! Enabled → DisabledByFailover: status == Unhealthy && config enabled
//! DisabledByFailover → Enabled: status == Healthy
//! ```
//!
//! # Design Decisions
//! - One lock over the whole map; read, decide, alert and write happen
//!   while holding it, so overlapping evaluations cannot double-fire
//! - The alert is persisted before the state flips; if storage fails the
//!   transition is retried on the next evaluation
//! - State is in memory only and rebuilt from check history after restart

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::alerts::{AlertManager, AlertType};
use crate::error::MonitorResult;
use crate::health::types::{HealthAggregate, HealthStatus};
use crate::observability::metrics;

/// Transition implied by a classification, if any.
pub fn decide(status: HealthStatus, config_enabled: bool, failed_over: bool) -> Option<AlertType> {
    match status {
        HealthStatus::Unhealthy if config_enabled && !failed_over => Some(AlertType::Failover),
        HealthStatus::Healthy if failed_over => Some(AlertType::Recovery),
        _ => None,
    }
}

/// Owns the provider → failed-over map.
pub struct FailoverController {
    state: Mutex<HashMap<String, bool>>,
    alerts: Arc<AlertManager>,
}

impl FailoverController {
    pub fn new(alerts: Arc<AlertManager>) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            alerts,
        }
    }

    /// Whether the provider is currently disabled by failover.
    pub async fn is_failed_over(&self, provider: &str) -> bool {
        self.state.lock().await.get(provider).copied().unwrap_or(false)
    }

    /// `config_enabled && !failed_over`.
    pub async fn is_enabled(&self, provider: &str, config_enabled: bool) -> bool {
        config_enabled && !self.is_failed_over(provider).await
    }

    /// Providers currently disabled by failover, sorted.
    pub async fn failed_over(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state
            .iter()
            .filter(|(_, failed)| **failed)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Apply a classification. Returns the transition that fired, if any.
    pub async fn apply(
        &self,
        provider: &str,
        config_enabled: bool,
        status: HealthStatus,
        aggregate: &HealthAggregate,
    ) -> MonitorResult<Option<AlertType>> {
        let mut state = self.state.lock().await;
        let failed_over = state.get(provider).copied().unwrap_or(false);

        let Some(transition) = decide(status, config_enabled, failed_over) else {
            return Ok(None);
        };

        let message = match transition {
            AlertType::Failover => format!(
                "Provider {} disabled after {} consecutive failures: {}",
                provider,
                aggregate.consecutive_failures,
                aggregate.last_error.as_deref().unwrap_or("unknown error"),
            ),
            AlertType::Recovery => format!(
                "Provider {} recovered (success rate {:.1}%), re-enabled",
                provider,
                aggregate.success_rate * 100.0,
            ),
        };

        self.alerts.raise(provider, transition, message).await?;

        let now_failed = transition == AlertType::Failover;
        state.insert(provider.to_string(), now_failed);

        tracing::warn!(
            provider = %provider,
            transition = %transition,
            consecutive_failures = aggregate.consecutive_failures,
            success_rate = aggregate.success_rate,
            "Failover state changed"
        );
        metrics::record_transition(provider, transition.as_str());
        metrics::record_provider_enabled(provider, config_enabled && !now_failed);

        Ok(Some(transition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::open;
    use crate::storage::AlertStore;

    fn controller() -> (tempfile::TempDir, FailoverController, Arc<AlertManager>) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open(&dir.path().join("health.sqlite"), 2).unwrap();
        let alerts = Arc::new(AlertManager::new(AlertStore::new(pool), None));
        (dir, FailoverController::new(alerts.clone()), alerts)
    }

    fn failing() -> HealthAggregate {
        HealthAggregate {
            total_checks: 4,
            consecutive_failures: 4,
            last_error: Some("Connection timeout".into()),
            ..HealthAggregate::default()
        }
    }

    #[test]
    fn test_decide_table() {
        use HealthStatus::*;
        assert_eq!(decide(Unhealthy, true, false), Some(AlertType::Failover));
        assert_eq!(decide(Unhealthy, true, true), None);
        assert_eq!(decide(Unhealthy, false, false), None);
        assert_eq!(decide(Healthy, true, true), Some(AlertType::Recovery));
        assert_eq!(decide(Healthy, false, true), Some(AlertType::Recovery));
        assert_eq!(decide(Healthy, true, false), None);
        assert_eq!(decide(Degraded, true, true), None);
        assert_eq!(decide(Unknown, true, true), None);
    }

    #[tokio::test]
    async fn test_failover_fires_once() {
        let (_dir, controller, alerts) = controller();

        let fired = controller.apply("openai", true, HealthStatus::Unhealthy, &failing()).await.unwrap();
        assert_eq!(fired, Some(AlertType::Failover));
        assert!(!controller.is_enabled("openai", true).await);

        let again = controller.apply("openai", true, HealthStatus::Unhealthy, &failing()).await.unwrap();
        assert_eq!(again, None);

        let stored = alerts.list_alerts(None, Some("openai")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].message.contains("4 consecutive failures: Connection timeout"));
    }

    #[tokio::test]
    async fn test_state_unchanged_when_alert_cannot_be_stored() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open(&dir.path().join("health.sqlite"), 2).unwrap();
        pool.get()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_alerts BEFORE INSERT ON health_alerts
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();
        let controller = FailoverController::new(Arc::new(AlertManager::new(AlertStore::new(pool.clone()), None)));

        let result = controller.apply("openai", true, HealthStatus::Unhealthy, &failing()).await;
        assert!(result.is_err());
        assert!(controller.is_enabled("openai", true).await);

        pool.get().unwrap().execute_batch("DROP TRIGGER reject_alerts;").unwrap();
        let fired = controller.apply("openai", true, HealthStatus::Unhealthy, &failing()).await.unwrap();
        assert_eq!(fired, Some(AlertType::Failover));
    }

    #[tokio::test]
    async fn test_degraded_does_not_recover() {
        let (_dir, controller, _alerts) = controller();
        controller.apply("openai", true, HealthStatus::Unhealthy, &failing()).await.unwrap();

        let fired = controller
            .apply("openai", true, HealthStatus::Degraded, &HealthAggregate::default())
            .await
            .unwrap();
        assert_eq!(fired, None);
        assert_eq!(controller.failed_over().await, vec!["openai".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_evaluations_fire_once() {
        let (_dir, controller, alerts) = controller();
        let controller = Arc::new(controller);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let controller = controller.clone();
            handles.push(tokio::spawn(async move {
                controller.apply("gemini", true, HealthStatus::Unhealthy, &failing()).await.unwrap()
            }));
        }
        let mut fired = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        assert_eq!(alerts.failover_count("gemini").await.unwrap(), 1);
    }
}
