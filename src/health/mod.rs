//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (periodic timer)
//!     → probe.rs (one connectivity test per provider)
//!     → storage::checks (append result)
//!     → storage::checks (windowed aggregate)
//!     → evaluator.rs (status)
//!     → failover.rs (enable/disable under lock)
//!     → alerts (persist + notify)
//! ```
//!
//! # Design Decisions
//! - Only a sustained run of failures disables a provider
//! - Recovery requires a Healthy classification, not one good probe
//! - Health views are derived on read; nothing aggregated is stored

pub mod evaluator;
pub mod failover;
pub mod monitor;
pub mod probe;
pub mod scheduler;
pub mod types;

pub use evaluator::HealthEvaluator;
pub use failover::FailoverController;
pub use monitor::{CheckOutcome, CycleReport, HealthMonitor, MonitorBuilder};
pub use probe::HealthProber;
pub use types::{HealthAggregate, HealthCheckResult, HealthStatus, ProviderHealth};
