//! SQLite connection pool and schema.

use std::path::{Path, PathBuf};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::MonitorResult;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Default directory for monitor state.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".provider-monitor")
}

pub fn create_pool(db_path: &Path, max_size: u32) -> MonitorResult<DbPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    // Concurrent writers (scheduler + CLI) wait for the lock instead of failing.
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));
    let pool = Pool::builder().max_size(max_size).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    Ok(pool)
}

pub fn init_db(pool: &DbPool) -> MonitorResult<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS health_checks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            provider TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            latency_ms REAL NOT NULL,
            success INTEGER NOT NULL CHECK(success IN (0, 1)),
            error_message TEXT,
            status_code INTEGER
        );

        CREATE TABLE IF NOT EXISTS health_alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            alert_id TEXT NOT NULL UNIQUE,
            provider TEXT NOT NULL,
            alert_type TEXT NOT NULL CHECK(alert_type IN ('failover', 'recovery')),
            message TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            acknowledged INTEGER NOT NULL DEFAULT 0 CHECK(acknowledged IN (0, 1))
        );

        CREATE INDEX IF NOT EXISTS idx_health_checks_provider_ts ON health_checks(provider, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_health_alerts_provider ON health_alerts(provider);",
    )?;

    Ok(())
}

/// Create the pool and make sure the schema exists.
pub fn open(db_path: &Path, max_size: u32) -> MonitorResult<DbPool> {
    let pool = create_pool(db_path, max_size)?;
    init_db(&pool)?;
    tracing::debug!(path = ?db_path, "Health database ready");
    Ok(pool)
}
