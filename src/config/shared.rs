//! Hot-swappable configuration handle.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::{MonitorConfig, ProviderConfig};
use crate::error::MonitorResult;
use crate::providers::ProviderDirectory;

/// Configuration shared between the scheduler, CLI commands and the admin API.
///
/// Readers always see a complete snapshot; reloads replace it atomically.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<MonitorConfig>>,
}

impl SharedConfig {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current configuration snapshot.
    pub fn load(&self) -> Arc<MonitorConfig> {
        self.inner.load_full()
    }

    /// Replace the configuration.
    pub fn store(&self, config: MonitorConfig) {
        self.inner.store(Arc::new(config));
    }
}

impl ProviderDirectory for SharedConfig {
    fn get_provider(&self, name: &str) -> Option<ProviderConfig> {
        self.inner.load().provider(name).cloned()
    }

    fn list_providers(&self) -> MonitorResult<Vec<ProviderConfig>> {
        Ok(self.inner.load().providers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_replaces_snapshot() {
        let shared = SharedConfig::new(MonitorConfig::default());
        assert!(shared.get_provider("openai").is_none());

        let mut next = MonitorConfig::default();
        next.providers.push(ProviderConfig::new("openai", "openai"));
        shared.store(next);

        assert!(shared.get_provider("openai").is_some());
        assert_eq!(shared.list_providers().unwrap().len(), 1);
    }
}
