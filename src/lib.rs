//! Provider health monitoring and automatic failover for LLM providers.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────┐   ┌──────────┐   ┌───────────────┐   ┌────────────┐
//!   │ scheduler │──▶│  prober  │──▶│ metrics store │──▶│ evaluator  │
//!   └───────────┘   └────┬─────┘   │   (SQLite)    │   └─────┬──────┘
//!                        │         └───────────────┘         │
//!                        ▼                                   ▼
//!               ┌─────────────────┐               ┌────────────────────┐
//!               │ provider        │               │ failover controller│
//!               │ registry/config │               │  (single lock)     │
//!               └─────────────────┘               └─────────┬──────────┘
//!                                                           ▼
//!                                                 ┌────────────────────┐
//!                                                 │   alert manager    │
//!                                                 │ store → callbacks  │
//!                                                 │       → webhook    │
//!                                                 └────────────────────┘
//! ```

pub mod admin;
pub mod alerts;
pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod providers;
pub mod storage;

pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use health::HealthMonitor;
pub use lifecycle::Shutdown;
