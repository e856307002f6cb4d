//! Durable store for health checks and alerts.
//!
//! # Data Flow
//! ```text
//! Prober result → checks.rs (append row)
//! Aggregate read → checks.rs (windowed stats + lookback run-length)
//! Alert → alerts.rs (insert once, acknowledge, list)
//! ```
//!
//! # Design Decisions
//! - Append-only rows; aggregates are computed at read time, never stored
//! - Every operation checks out its own pooled connection
//! - Timestamps stored as fixed-width RFC 3339 UTC text so they sort lexically

pub mod alerts;
pub mod checks;
pub mod db;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{MonitorError, MonitorResult};

pub use alerts::AlertStore;
pub use checks::MetricsStore;
pub use db::{create_pool, init_db, open, DbPool};

/// Encode a timestamp for storage.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp.
pub(crate) fn decode_timestamp(raw: &str) -> MonitorResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| MonitorError::Corrupt(format!("bad timestamp '{}': {}", raw, e)))
}

/// Run a blocking store operation off the async runtime threads.
pub async fn run_blocking<T, F>(op: F) -> MonitorResult<T>
where
    F: FnOnce() -> MonitorResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op).await?
}
