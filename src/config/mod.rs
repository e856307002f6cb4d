//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → SharedConfig (arc-swap) read by prober and scheduler
//!
//! On file change (monitor mode):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<MonitorConfig>
//!     → next probe observes new provider settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod shared;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{AdminConfig, AlertConfig, HealthConfig, MonitorConfig, ProviderConfig, StorageConfig};
pub use shared::SharedConfig;
