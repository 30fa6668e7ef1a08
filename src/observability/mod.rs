//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Policy executor and gateway produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (policy counters and latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; the binary installs subscribers
//! - Metric updates go through the `metrics` facade and are no-ops until a
//!   recorder is installed

pub mod logging;
pub mod metrics;
