//! Provider kind → client constructor registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::providers::http::{AuthStyle, HttpProviderClient};
use crate::providers::{HealthCheckable, ProviderError};

/// Constructor producing a probe client for one provider configuration.
pub type ClientFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Box<dyn HealthCheckable>, ProviderError> + Send + Sync>;

/// Maps provider kinds to client constructors.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ClientFactory>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in HTTP provider kinds.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_http("openai", Some("https://api.openai.com/v1"), Some("OPENAI_API_KEY"), AuthStyle::Bearer);
        registry.register_http("deepseek", Some("https://api.deepseek.com/v1"), Some("DEEPSEEK_API_KEY"), AuthStyle::Bearer);
        registry.register_http(
            "gemini",
            Some("https://generativelanguage.googleapis.com/v1beta"),
            Some("GEMINI_API_KEY"),
            AuthStyle::GoogApiKey,
        );
        registry.register_http("openai_compatible", None, None, AuthStyle::Bearer);
        registry
    }

    /// Register (or replace) the constructor for a provider kind.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderConfig) -> Result<Box<dyn HealthCheckable>, ProviderError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    fn register_http(
        &mut self,
        kind: &str,
        default_base: Option<&'static str>,
        default_key_env: Option<&'static str>,
        auth: AuthStyle,
    ) {
        self.register(kind, move |config| {
            let client = HttpProviderClient::from_config(config, default_base, default_key_env, auth)?;
            Ok(Box::new(client) as Box<dyn HealthCheckable>)
        });
    }

    /// Instantiate the client for a provider.
    pub fn build(&self, config: &ProviderConfig) -> Result<Box<dyn HealthCheckable>, ProviderError> {
        let factory = self
            .factories
            .get(&config.kind)
            .ok_or_else(|| ProviderError::UnknownKind(config.kind.clone()))?;
        factory(config)
    }

    /// Registered provider kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
