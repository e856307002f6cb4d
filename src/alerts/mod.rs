//! Failover and recovery notifications.
//!
//! # Data Flow
//! ```text
//! Failover controller transition
//!     → manager.rs (build alert, persist)
//!     → in-process callbacks (registration order)
//!     → webhook.rs (JSON POST, best effort)
//! ```
//!
//! # Design Decisions
//! - Persist before dispatch; a lost notification never loses the record
//! - Delivery failures are logged and never reach the controller
//! - No retries: the next transition produces the next alert

pub mod manager;
pub mod types;
pub mod webhook;

pub use manager::{AlertCallback, AlertManager, CallbackError};
pub use types::{AlertType, HealthAlert};
pub use webhook::WebhookNotifier;
