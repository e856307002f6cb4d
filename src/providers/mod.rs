//! Provider collaborators.
//!
//! # Data Flow
//! ```text
//! ProviderDirectory (config source)
//!     → ProviderConfig {kind, enabled, ...}
//!     → ProviderRegistry (kind → constructor)
//!     → Box<dyn HealthCheckable>
//!     → test_connection()
//! ```
//!
//! # Design Decisions
//! - The monitor only sees the `HealthCheckable` capability, never payloads
//! - New provider kinds are added by registering a constructor
//! - Configuration lookup is a trait so hosts can supply their own source

pub mod error;
pub mod http;
pub mod registry;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::MonitorResult;

pub use error::ProviderError;
pub use http::{AuthStyle, HttpProviderClient};
pub use registry::{ClientFactory, ProviderRegistry};

/// Minimal capability the monitor needs from a provider client.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Perform one lightweight request against the provider.
    ///
    /// On success returns the HTTP status code when the transport has one.
    async fn test_connection(&self) -> Result<Option<u16>, ProviderError>;
}

/// Source of provider configuration.
pub trait ProviderDirectory: Send + Sync {
    /// Look up a provider by name.
    fn get_provider(&self, name: &str) -> Option<ProviderConfig>;

    /// All configured providers, enabled or not.
    fn list_providers(&self) -> MonitorResult<Vec<ProviderConfig>>;
}
