//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::shared::SharedConfig;

/// A watcher that reloads the configuration file into a [`SharedConfig`].
pub struct ConfigWatcher {
    path: PathBuf,
    target: SharedConfig,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    pub fn new(path: &Path, target: SharedConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            target,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for reloads to continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let target = self.target.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Config file change detected, reloading");
                        reload(&path, &target);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load, validate and swap in the file's configuration.
///
/// Returns whether the swap happened; an invalid file leaves `target` as is.
fn reload(path: &Path, target: &SharedConfig) -> bool {
    match load_config(path) {
        Ok(new_config) => {
            tracing::info!(providers = new_config.providers.len(), "Configuration reloaded");
            target.store(new_config);
            true
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Config reload failed, keeping current configuration");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::providers::ProviderDirectory;

    #[test]
    fn test_reload_swaps_valid_config_and_keeps_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        let shared = SharedConfig::new(MonitorConfig::default());

        std::fs::write(&path, "[[providers]]\nname = \"openai\"\nkind = \"openai\"\n").unwrap();
        assert!(reload(&path, &shared));
        assert!(shared.get_provider("openai").is_some());

        std::fs::write(&path, "[health]\nfailover_threshold = 0\n").unwrap();
        assert!(!reload(&path, &shared));
        assert!(shared.get_provider("openai").is_some());
        assert_eq!(shared.load().health.failover_threshold, 3);
    }
}
