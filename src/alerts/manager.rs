//! Alert generation, persistence and dispatch.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::RwLock;

use chrono::Utc;

use crate::alerts::types::{AlertType, HealthAlert};
use crate::alerts::webhook::WebhookNotifier;
use crate::error::{MonitorError, MonitorResult};
use crate::observability::metrics;
use crate::storage::{run_blocking, AlertStore};

/// Ids tried for one alert before giving up.
const MAX_ID_ATTEMPTS: u32 = 100;

/// Error returned by an alert callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// In-process alert subscriber.
pub type AlertCallback = Box<dyn Fn(&HealthAlert) -> Result<(), CallbackError> + Send + Sync>;

/// Creates, stores and fans out health alerts.
pub struct AlertManager {
    store: AlertStore,
    callbacks: RwLock<Vec<AlertCallback>>,
    webhook: Option<WebhookNotifier>,
}

impl AlertManager {
    pub fn new(store: AlertStore, webhook: Option<WebhookNotifier>) -> Self {
        Self {
            store,
            callbacks: RwLock::new(Vec::new()),
            webhook,
        }
    }

    /// Add a callback; callbacks run in registration order.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(&HealthAlert) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    pub fn webhook(&self) -> Option<&WebhookNotifier> {
        self.webhook.as_ref()
    }

    /// Persist a new alert, then dispatch it.
    ///
    /// Storage errors propagate; delivery errors are only logged. When the
    /// id is already taken (same provider and type within one second) the
    /// alert is stored as `{id}-2`, `{id}-3` and so on.
    pub async fn raise(
        &self,
        provider: &str,
        alert_type: AlertType,
        message: impl Into<String>,
    ) -> MonitorResult<HealthAlert> {
        let mut alert = HealthAlert::new(provider, alert_type, message, Utc::now());
        let base_id = alert.alert_id.clone();

        let mut attempt = 1;
        loop {
            let store = self.store.clone();
            let record = alert.clone();
            if run_blocking(move || store.insert(&record)).await? {
                break;
            }
            if attempt >= MAX_ID_ATTEMPTS {
                return Err(MonitorError::DuplicateAlert(base_id));
            }
            attempt += 1;
            tracing::debug!(alert_id = %alert.alert_id, "Alert id taken, adding sequence suffix");
            alert.alert_id = format!("{}-{}", base_id, attempt);
        }

        tracing::warn!(
            alert_id = %alert.alert_id,
            provider = %alert.provider,
            alert_type = %alert.alert_type,
            message = %alert.message,
            "Health alert raised"
        );

        self.run_callbacks(&alert);
        self.send_webhook(&alert).await;
        Ok(alert)
    }

    fn run_callbacks(&self, alert: &HealthAlert) {
        let callbacks = self.callbacks.read().unwrap_or_else(|e| e.into_inner());
        for (index, callback) in callbacks.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| callback(alert))) {
                Ok(Ok(())) => metrics::record_alert_delivery("callback", true),
                Ok(Err(e)) => {
                    tracing::error!(alert_id = %alert.alert_id, callback = index, error = %e, "Alert callback failed");
                    metrics::record_alert_delivery("callback", false);
                }
                Err(_) => {
                    tracing::error!(alert_id = %alert.alert_id, callback = index, "Alert callback panicked");
                    metrics::record_alert_delivery("callback", false);
                }
            }
        }
    }

    async fn send_webhook(&self, alert: &HealthAlert) {
        let Some(webhook) = &self.webhook else {
            return;
        };
        match webhook.send(alert).await {
            Ok(()) => {
                tracing::info!(alert_id = %alert.alert_id, url = %webhook.url(), "Webhook delivered");
                metrics::record_alert_delivery("webhook", true);
            }
            Err(e) => {
                tracing::error!(alert_id = %alert.alert_id, url = %webhook.url(), error = %e, "Webhook delivery failed");
                metrics::record_alert_delivery("webhook", false);
            }
        }
    }

    /// Mark an alert acknowledged. Returns `false` if it does not exist.
    pub async fn acknowledge(&self, alert_id: &str) -> MonitorResult<bool> {
        let store = self.store.clone();
        let alert_id = alert_id.to_string();
        run_blocking(move || store.acknowledge(&alert_id)).await
    }

    pub async fn get_alert(&self, alert_id: &str) -> MonitorResult<Option<HealthAlert>> {
        let store = self.store.clone();
        let alert_id = alert_id.to_string();
        run_blocking(move || store.get(&alert_id)).await
    }

    /// Alerts filtered by acknowledgement and provider, newest first.
    pub async fn list_alerts(
        &self,
        acknowledged: Option<bool>,
        provider: Option<&str>,
    ) -> MonitorResult<Vec<HealthAlert>> {
        let store = self.store.clone();
        let provider = provider.map(str::to_string);
        run_blocking(move || store.list(acknowledged, provider.as_deref())).await
    }

    /// Number of failovers recorded for a provider.
    pub async fn failover_count(&self, provider: &str) -> MonitorResult<u64> {
        let store = self.store.clone();
        let provider = provider.to_string();
        run_blocking(move || store.count(&provider, AlertType::Failover)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::storage::db::open;

    fn manager(webhook: Option<WebhookNotifier>) -> (tempfile::TempDir, AlertManager) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open(&dir.path().join("health.sqlite"), 2).unwrap();
        (dir, AlertManager::new(AlertStore::new(pool), webhook))
    }

    #[tokio::test]
    async fn test_callbacks_run_in_order_and_survive_failures() {
        let (_dir, manager) = manager(None);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        manager.register_callback(move |_| {
            s.lock().unwrap().push("first");
            Err("first callback failed".into())
        });
        manager.register_callback(|_| panic!("callback bug"));
        let s = seen.clone();
        manager.register_callback(move |alert| {
            s.lock().unwrap().push("third");
            assert_eq!(alert.alert_type, AlertType::Failover);
            Ok(())
        });

        let alert = manager.raise("openai", AlertType::Failover, "down").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["first", "third"]);

        let stored = manager.list_alerts(None, Some("openai")).await.unwrap();
        assert_eq!(stored, vec![alert]);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_does_not_fail_raise() {
        let webhook = WebhookNotifier::new("http://127.0.0.1:9/alerts", Duration::from_millis(200)).unwrap();
        let (_dir, manager) = manager(Some(webhook));

        let alert = manager.raise("gemini", AlertType::Recovery, "back").await.unwrap();
        assert_eq!(alert.provider, "gemini");
        assert_eq!(manager.list_alerts(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_colliding_alert_ids_get_a_suffix() {
        let (_dir, manager) = manager(None);
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        manager.register_callback(move |_| {
            *c.lock().unwrap() += 1;
            Ok(())
        });

        let first = manager.raise("openai", AlertType::Failover, "down").await.unwrap();
        // Occupy the next id a same-second failover would get.
        let mut taken = first.clone();
        taken.alert_id = format!("{}-2", first.alert_id);
        let store = manager.store.clone();
        assert!(store.insert(&taken).unwrap());
        assert!(!store.insert(&first).unwrap());

        let second = manager.raise("openai", AlertType::Failover, "down again").await.unwrap();
        assert_ne!(second.alert_id, first.alert_id);
        assert_ne!(second.alert_id, taken.alert_id);
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(manager.failover_count("openai").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_acknowledge_and_count() {
        let (_dir, manager) = manager(None);
        let alert = manager.raise("openai", AlertType::Failover, "down").await.unwrap();

        assert!(manager.acknowledge(&alert.alert_id).await.unwrap());
        assert!(manager.acknowledge(&alert.alert_id).await.unwrap());
        assert!(!manager.acknowledge("nope").await.unwrap());

        assert!(manager.list_alerts(Some(false), None).await.unwrap().is_empty());
        assert_eq!(manager.failover_count("openai").await.unwrap(), 1);

        let fetched = manager.get_alert(&alert.alert_id).await.unwrap().unwrap();
        assert!(fetched.acknowledged);
        assert!(manager.get_alert("nope").await.unwrap().is_none());
    }
}
