//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Open the durable store and ensure its schema
//! - Build the health monitor from the loaded pieces
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to the caller
//! - A missing config file means defaults, not an error

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{load_config_or_default, MonitorConfig, SharedConfig};
use crate::error::MonitorResult;
use crate::health::{HealthMonitor, MonitorBuilder};
use crate::storage::{self, DbPool};

/// Everything a command needs after startup.
pub struct Runtime {
    pub config: MonitorConfig,
    pub shared: SharedConfig,
    pub pool: DbPool,
    pub config_path: PathBuf,
}

impl Runtime {
    /// Monitor builder wired to this runtime's config and store.
    pub fn monitor_builder(&self) -> MonitorResult<MonitorBuilder> {
        HealthMonitor::from_config(&self.config, self.pool.clone(), Arc::new(self.shared.clone()))
    }
}

/// Load configuration (optionally overriding the database path) and open storage.
pub fn bootstrap(config_path: &Path, database_override: Option<&Path>) -> MonitorResult<Runtime> {
    let mut config = load_config_or_default(config_path)?;
    if let Some(path) = database_override {
        config.storage.database_path = path.to_path_buf();
    }

    let pool = storage::open(&config.storage.database_path, config.storage.pool_size)?;
    tracing::debug!(
        config = ?config_path,
        database = ?config.storage.database_path,
        providers = config.providers.len(),
        "Startup complete"
    );

    Ok(Runtime {
        shared: SharedConfig::new(config.clone()),
        config,
        pool,
        config_path: config_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_with_defaults_and_db_override() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("state").join("health.sqlite");
        let runtime = bootstrap(&dir.path().join("missing.toml"), Some(&db)).unwrap();

        assert_eq!(runtime.config.storage.database_path, db);
        assert!(db.exists());
        assert!(runtime.config.providers.is_empty());
    }
}
