//! Metrics collection and exposition.
//!
//! # Metrics
//! - `provider_probe_total` (counter): probes by provider, outcome
//! - `provider_probe_latency_ms` (histogram): probe latency by provider
//! - `provider_enabled` (gauge): 1=enabled, 0=disabled by failover
//! - `provider_failover_transitions_total` (counter): by provider, type
//! - `provider_alert_deliveries_total` (counter): by channel, outcome

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_probe(provider: &str, success: bool, latency_ms: f64) {
    let outcome = if success { "success" } else { "failure" };
    counter!("provider_probe_total", "provider" => provider.to_string(), "outcome" => outcome).increment(1);
    if success {
        histogram!("provider_probe_latency_ms", "provider" => provider.to_string()).record(latency_ms);
    }
}

pub fn record_provider_enabled(provider: &str, enabled: bool) {
    gauge!("provider_enabled", "provider" => provider.to_string()).set(if enabled { 1.0 } else { 0.0 });
}

pub fn record_transition(provider: &str, alert_type: &'static str) {
    counter!(
        "provider_failover_transitions_total",
        "provider" => provider.to_string(),
        "type" => alert_type
    )
    .increment(1);
}

pub fn record_alert_delivery(channel: &'static str, ok: bool) {
    let outcome = if ok { "delivered" } else { "failed" };
    counter!("provider_alert_deliveries_total", "channel" => channel, "outcome" => outcome).increment(1);
}
