//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Open store → Build monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop scheduler → Stop admin API → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then background tasks
//! - Shutdown has timeout: the scheduler is not awaited forever

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
