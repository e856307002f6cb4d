//! Health monitor service.
//!
//! Owns the prober, metrics store, evaluator, failover controller and alert
//! manager for one process, plus the lifecycle of the background scheduler.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time;

use crate::alerts::{AlertManager, AlertType, WebhookNotifier};
use crate::config::{HealthConfig, MonitorConfig};
use crate::error::MonitorResult;
use crate::health::evaluator::HealthEvaluator;
use crate::health::failover::FailoverController;
use crate::health::probe::HealthProber;
use crate::health::scheduler::{self, SchedulerSettings};
use crate::health::types::{HealthCheckResult, ProviderHealth};
use crate::lifecycle::Shutdown;
use crate::providers::{ProviderDirectory, ProviderRegistry};
use crate::storage::{run_blocking, AlertStore, DbPool, MetricsStore};

/// Outcome of one probe-record-evaluate pass for a provider.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub result: HealthCheckResult,
    pub health: ProviderHealth,
    pub transition: Option<AlertType>,
}

/// Summary of one scheduler cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub checked: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: usize,
    pub transitions: Vec<(String, AlertType)>,
}

pub(crate) struct MonitorCore {
    directory: Arc<dyn ProviderDirectory>,
    prober: HealthProber,
    metrics: MetricsStore,
    evaluator: HealthEvaluator,
    failover: FailoverController,
    alerts: Arc<AlertManager>,
    window_hours: u32,
}

impl MonitorCore {
    async fn check_provider(&self, provider: &str) -> MonitorResult<CheckOutcome> {
        let result = self.prober.check_provider_health(provider).await;

        let store = self.metrics.clone();
        let record = result.clone();
        run_blocking(move || store.record(&record)).await?;

        let store = self.metrics.clone();
        let name = provider.to_string();
        let window = self.window_hours;
        let aggregate = run_blocking(move || store.aggregate(&name, window)).await?;

        let status = self.evaluator.evaluate(&aggregate);
        let config_enabled = self
            .directory
            .get_provider(provider)
            .map(|p| p.enabled)
            .unwrap_or(false);
        let transition = self
            .failover
            .apply(provider, config_enabled, status, &aggregate)
            .await?;

        let is_enabled = self.failover.is_enabled(provider, config_enabled).await;
        let failover_count = self.alerts.failover_count(provider).await?;
        let health = ProviderHealth::from_aggregate(provider, status, aggregate, is_enabled, failover_count);

        Ok(CheckOutcome {
            result,
            health,
            transition,
        })
    }

    async fn provider_health(&self, provider: &str, window_hours: u32) -> MonitorResult<ProviderHealth> {
        let store = self.metrics.clone();
        let name = provider.to_string();
        let aggregate = run_blocking(move || store.aggregate(&name, window_hours)).await?;

        let status = self.evaluator.evaluate(&aggregate);
        let config_enabled = self
            .directory
            .get_provider(provider)
            .map(|p| p.enabled)
            .unwrap_or(false);
        let is_enabled = self.failover.is_enabled(provider, config_enabled).await;
        let failover_count = self.alerts.failover_count(provider).await?;

        Ok(ProviderHealth::from_aggregate(provider, status, aggregate, is_enabled, failover_count))
    }

    pub(crate) async fn run_cycle(&self) -> MonitorResult<CycleReport> {
        let providers = self.directory.list_providers()?;
        let mut report = CycleReport::default();

        for provider in providers.iter().filter(|p| p.enabled) {
            match self.check_provider(&provider.name).await {
                Ok(outcome) => {
                    report.checked += 1;
                    if outcome.result.success {
                        report.succeeded += 1;
                    } else {
                        report.failed += 1;
                    }
                    if let Some(transition) = outcome.transition {
                        report.transitions.push((provider.name.clone(), transition));
                    }
                }
                Err(e) => {
                    tracing::error!(provider = %provider.name, error = %e, "Provider health check failed");
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Builder for [`HealthMonitor`].
pub struct MonitorBuilder {
    pool: DbPool,
    directory: Arc<dyn ProviderDirectory>,
    registry: ProviderRegistry,
    health: HealthConfig,
    webhook: Option<WebhookNotifier>,
}

impl MonitorBuilder {
    /// Provider kind registry (defaults to the built-in HTTP kinds).
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn health_config(mut self, health: HealthConfig) -> Self {
        self.health = health;
        self
    }

    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.health.check_interval_secs = interval.as_secs().max(1);
        self
    }

    pub fn webhook(mut self, webhook: Option<WebhookNotifier>) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn build(self) -> HealthMonitor {
        let alerts = Arc::new(AlertManager::new(AlertStore::new(self.pool.clone()), self.webhook));
        let metrics = MetricsStore::new(self.pool).with_lookback(self.health.failure_lookback);

        let core = MonitorCore {
            prober: HealthProber::new(self.directory.clone(), Arc::new(self.registry)),
            directory: self.directory,
            metrics,
            evaluator: HealthEvaluator::from_config(&self.health),
            failover: FailoverController::new(alerts.clone()),
            alerts,
            window_hours: self.health.window_hours,
        };

        HealthMonitor {
            core: Arc::new(core),
            settings: SchedulerSettings {
                interval: Duration::from_secs(self.health.check_interval_secs),
                error_retry: Duration::from_secs(self.health.error_retry_secs),
                stop_timeout: Duration::from_secs(self.health.stop_timeout_secs),
            },
            shutdown: Shutdown::new(),
            worker: Mutex::new(None),
        }
    }
}

/// Provider health monitor with automatic failover.
pub struct HealthMonitor {
    core: Arc<MonitorCore>,
    settings: SchedulerSettings,
    shutdown: Shutdown,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub fn builder(pool: DbPool, directory: Arc<dyn ProviderDirectory>) -> MonitorBuilder {
        MonitorBuilder {
            pool,
            directory,
            registry: ProviderRegistry::with_defaults(),
            health: HealthConfig::default(),
            webhook: None,
        }
    }

    /// Monitor configured from a full [`MonitorConfig`].
    pub fn from_config(
        config: &MonitorConfig,
        pool: DbPool,
        directory: Arc<dyn ProviderDirectory>,
    ) -> MonitorResult<MonitorBuilder> {
        let webhook = match &config.alerts.webhook_url {
            Some(url) => Some(WebhookNotifier::new(
                url.clone(),
                Duration::from_secs(config.alerts.webhook_timeout_secs),
            )?),
            None => None,
        };
        Ok(Self::builder(pool, directory)
            .health_config(config.health.clone())
            .webhook(webhook))
    }

    /// Probe only; nothing is recorded.
    pub async fn check_provider_health(&self, provider: &str) -> HealthCheckResult {
        self.core.prober.check_provider_health(provider).await
    }

    /// Probe, record and apply failover/recovery for one provider.
    pub async fn check_provider(&self, provider: &str) -> MonitorResult<CheckOutcome> {
        self.core.check_provider(provider).await
    }

    /// Read-only health view over the configured window.
    pub async fn provider_health(&self, provider: &str) -> MonitorResult<ProviderHealth> {
        self.core.provider_health(provider, self.core.window_hours).await
    }

    /// Read-only health view over an explicit window.
    pub async fn provider_health_window(&self, provider: &str, window_hours: u32) -> MonitorResult<ProviderHealth> {
        self.core.provider_health(provider, window_hours).await
    }

    /// Health of every configured provider, in configuration order.
    pub async fn all_provider_health(&self, window_hours: Option<u32>) -> MonitorResult<Vec<ProviderHealth>> {
        let window = window_hours.unwrap_or(self.core.window_hours);
        let mut views = Vec::new();
        for provider in self.core.directory.list_providers()? {
            views.push(self.core.provider_health(&provider.name, window).await?);
        }
        Ok(views)
    }

    /// Raw checks within the last `hours`, newest first.
    pub async fn history(&self, provider: &str, hours: u32) -> MonitorResult<Vec<HealthCheckResult>> {
        let store = self.core.metrics.clone();
        let provider = provider.to_string();
        run_blocking(move || store.history(&provider, hours)).await
    }

    /// One pass over all enabled providers.
    pub async fn run_cycle(&self) -> MonitorResult<CycleReport> {
        self.core.run_cycle().await
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.core.alerts
    }

    pub fn failover(&self) -> &FailoverController {
        &self.core.failover
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the scheduler task. Calling it while running does nothing.
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::warn!("Health monitor already running");
            return;
        }
        let handle = tokio::spawn(scheduler::run(
            self.core.clone(),
            self.settings,
            self.shutdown.subscribe(),
        ));
        *worker = Some(handle);
        tracing::info!("Health monitor started");
    }

    /// Signal the scheduler and wait for it, bounded by the stop timeout.
    ///
    /// A probe already in flight is left to complete.
    pub async fn stop(&self) {
        let handle = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(handle) = handle else {
            return;
        };

        self.shutdown.trigger();
        match time::timeout(self.settings.stop_timeout, handle).await {
            Ok(Ok(())) => tracing::info!("Health monitor stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Health monitor task ended abnormally"),
            Err(_) => tracing::warn!(
                timeout_secs = self.settings.stop_timeout.as_secs(),
                "Health monitor did not stop in time; in-flight check left to finish"
            ),
        }
    }
}
