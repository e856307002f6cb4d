//! Append-only health check log and read-time aggregation.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Row};

use crate::error::MonitorResult;
use crate::health::types::{HealthAggregate, HealthCheckResult};
use crate::storage::db::DbPool;
use crate::storage::{decode_timestamp, encode_timestamp};

/// Number of most recent raw checks inspected for failure run-length.
pub const DEFAULT_FAILURE_LOOKBACK: u32 = 10;

const SELECT_COLUMNS: &str =
    "provider, timestamp, latency_ms, success, error_message, status_code";

/// Durable log of probe results.
#[derive(Clone)]
pub struct MetricsStore {
    pool: DbPool,
    lookback: u32,
}

impl MetricsStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            lookback: DEFAULT_FAILURE_LOOKBACK,
        }
    }

    /// Override how many recent checks feed `consecutive_failures`.
    pub fn with_lookback(mut self, lookback: u32) -> Self {
        self.lookback = lookback.max(1);
        self
    }

    /// Append one result. Rows are never updated or deleted.
    pub fn record(&self, result: &HealthCheckResult) -> MonitorResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO health_checks (provider, timestamp, latency_ms, success, error_message, status_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.provider,
                encode_timestamp(&result.timestamp),
                result.latency_ms,
                result.success,
                result.error_message,
                result.status_code,
            ],
        )?;
        Ok(())
    }

    /// Aggregate the provider's checks over the last `window_hours`.
    pub fn aggregate(&self, provider: &str, window_hours: u32) -> MonitorResult<HealthAggregate> {
        self.aggregate_at(provider, window_hours, Utc::now())
    }

    /// [`aggregate`](Self::aggregate) with an explicit reference instant.
    pub fn aggregate_at(
        &self,
        provider: &str,
        window_hours: u32,
        now: DateTime<Utc>,
    ) -> MonitorResult<HealthAggregate> {
        let windowed = self.history_at(provider, window_hours, now)?;
        let recent = self.recent(provider, self.lookback)?;

        let mut aggregate = windowed_stats(&windowed);
        apply_recent(&mut aggregate, &recent);
        Ok(aggregate)
    }

    /// Raw checks within the last `hours`, newest first.
    pub fn history(&self, provider: &str, hours: u32) -> MonitorResult<Vec<HealthCheckResult>> {
        self.history_at(provider, hours, Utc::now())
    }

    pub fn history_at(
        &self,
        provider: &str,
        hours: u32,
        now: DateTime<Utc>,
    ) -> MonitorResult<Vec<HealthCheckResult>> {
        let cutoff = window_start(now, hours).map(|ts| encode_timestamp(&ts));
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_checks
             WHERE provider = ?1 AND (?2 IS NULL OR timestamp >= ?2)
             ORDER BY timestamp DESC, id DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![provider, cutoff], raw_row)?;
        collect_rows(rows)
    }

    /// The `limit` most recent checks regardless of age, newest first.
    pub fn recent(&self, provider: &str, limit: u32) -> MonitorResult<Vec<HealthCheckResult>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_checks
             WHERE provider = ?1
             ORDER BY timestamp DESC, id DESC
             LIMIT ?2",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![provider, limit], raw_row)?;
        collect_rows(rows)
    }
}

/// Start of a window of `hours` ending at `now`; `None` when it reaches
/// past the earliest representable instant, meaning every row.
fn window_start(now: DateTime<Utc>, hours: u32) -> Option<DateTime<Utc>> {
    Duration::try_hours(i64::from(hours)).and_then(|span| now.checked_sub_signed(span))
}

type RawRow = (String, String, f64, bool, Option<String>, Option<u16>);

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
) -> MonitorResult<Vec<HealthCheckResult>> {
    let mut results = Vec::new();
    for row in rows {
        let (provider, timestamp, latency_ms, success, error_message, status_code) = row?;
        results.push(HealthCheckResult {
            provider,
            timestamp: decode_timestamp(&timestamp)?,
            latency_ms,
            success,
            error_message,
            status_code,
        });
    }
    Ok(results)
}

/// Count-based statistics over the windowed rows.
fn windowed_stats(rows: &[HealthCheckResult]) -> HealthAggregate {
    let total = rows.len();
    let mut latencies: Vec<f64> = rows
        .iter()
        .filter(|r| r.success)
        .map(|r| r.latency_ms)
        .collect();

    let success_rate = if total == 0 {
        0.0
    } else {
        latencies.len() as f64 / total as f64
    };

    HealthAggregate {
        total_checks: total as u64,
        avg_latency_ms: mean(&latencies),
        p95_latency_ms: p95(&mut latencies),
        success_rate,
        ..HealthAggregate::default()
    }
}

/// Fill the run-length fields from the newest-first lookback rows.
fn apply_recent(aggregate: &mut HealthAggregate, recent: &[HealthCheckResult]) {
    aggregate.consecutive_failures = recent.iter().take_while(|r| !r.success).count() as u32;
    aggregate.last_check = recent.first().map(|r| r.timestamp);
    aggregate.last_success = recent.iter().find(|r| r.success).map(|r| r.timestamp);
    aggregate.last_error = recent
        .iter()
        .find(|r| !r.success)
        .and_then(|r| r.error_message.clone());
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Value at index `min(ceil(0.95 * n), n - 1)` of the sorted values.
fn p95(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    let idx = ((0.95 * n as f64).ceil() as usize).min(n - 1);
    values[idx]
}
