//! HTTP connectivity probe for LLM provider APIs.
//!
//! Every supported provider exposes a cheap "list models" endpoint; a
//! successful GET there proves DNS, TLS, routing and credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::config::ProviderConfig;
use crate::providers::{HealthCheckable, ProviderError};

/// Longest error body kept in a failure message.
const MAX_ERROR_BODY: usize = 200;

/// How the API key is attached to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-goog-api-key: <key>`
    GoogApiKey,
}

/// Probe client for providers with a `GET {base}/models` endpoint.
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: reqwest::Client,
    models_url: String,
    headers: HeaderMap,
}

impl HttpProviderClient {
    /// Build a client from explicit parts.
    pub fn new(
        base_url: &str,
        auth: AuthStyle,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let (name, value) = match auth {
                AuthStyle::Bearer => (AUTHORIZATION, format!("Bearer {}", key)),
                AuthStyle::GoogApiKey => (HeaderName::from_static("x-goog-api-key"), key.to_string()),
            };
            let value = HeaderValue::from_str(&value)
                .map_err(|e| ProviderError::Other(format!("Invalid API key header: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("provider-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            models_url: format!("{}/models", base_url.trim_end_matches('/')),
            headers,
        })
    }

    /// Build a client from provider configuration.
    ///
    /// `base_url` in the config overrides `default_base`; the API key is read
    /// from `api_key_env`, falling back to `default_key_env`. A key is
    /// required only when `default_key_env` is set.
    pub fn from_config(
        config: &ProviderConfig,
        default_base: Option<&str>,
        default_key_env: Option<&str>,
        auth: AuthStyle,
    ) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .as_deref()
            .or(default_base)
            .ok_or_else(|| ProviderError::MissingBaseUrl(config.name.clone()))?;

        let key_env = config.api_key_env.as_deref().or(default_key_env);
        let api_key = match key_env {
            Some(var) => match std::env::var(var) {
                Ok(key) if !key.is_empty() => Some(key),
                _ if default_key_env.is_some() => {
                    return Err(ProviderError::MissingApiKey(var.to_string()))
                }
                _ => None,
            },
            None => None,
        };

        Self::new(
            base_url,
            auth,
            api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL probed by [`HealthCheckable::test_connection`].
    pub fn models_url(&self) -> &str {
        &self.models_url
    }
}

#[async_trait]
impl HealthCheckable for HttpProviderClient {
    async fn test_connection(&self) -> Result<Option<u16>, ProviderError> {
        let response = self
            .client
            .get(&self.models_url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(Some(status.as_u16()));
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(ProviderError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
