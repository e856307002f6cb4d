//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (human-readable or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, monitor mode only)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`provider`, `latency_ms`, `error`) on every event
//! - Logs go to stderr so `--json` output on stdout stays parseable
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
