//! Provider client errors.

use thiserror::Error;

/// Errors raised while building or exercising a provider client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No constructor is registered for the provider kind.
    #[error("Unknown provider kind '{0}'")]
    UnknownKind(String),

    /// The API key environment variable is not set.
    #[error("API key not set (expected environment variable {0})")]
    MissingApiKey(String),

    /// The provider has no usable base URL.
    #[error("Provider base URL missing: {0}")]
    MissingBaseUrl(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other failure reported by a client implementation.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// HTTP status code associated with the failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Http { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
