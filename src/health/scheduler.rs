//! Periodic health checking.
//!
//! # Responsibilities
//! - Run one check cycle per interval over configured, enabled providers
//! - Keep going when a single provider's check fails
//! - Back off to a fixed retry delay when a whole cycle fails
//!
//! Providers are probed one after another by this single task, so a cycle
//! takes up to (provider count × probe timeout). The interval is measured
//! from the end of one cycle to the start of the next.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::health::monitor::MonitorCore;

/// Timing parameters of the scheduler loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerSettings {
    /// Delay between successful cycles.
    pub interval: Duration,
    /// Delay after a cycle that failed as a whole.
    pub error_retry: Duration,
    /// Longest wait for the loop to exit on stop.
    pub stop_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            error_retry: Duration::from_secs(60),
            stop_timeout: Duration::from_secs(10),
        }
    }
}

pub(crate) async fn run(
    core: Arc<MonitorCore>,
    settings: SchedulerSettings,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!(
        interval_secs = settings.interval.as_secs(),
        "Health scheduler starting"
    );

    loop {
        let delay = match core.run_cycle().await {
            Ok(report) => {
                tracing::info!(
                    checked = report.checked,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    errors = report.errors,
                    transitions = report.transitions.len(),
                    "Health check cycle complete"
                );
                settings.interval
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    retry_secs = settings.error_retry.as_secs(),
                    "Health check cycle failed"
                );
                settings.error_retry
            }
        };

        tokio::select! {
            _ = time::sleep(delay) => {}
            _ = shutdown.recv() => {
                tracing::info!("Health scheduler received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
