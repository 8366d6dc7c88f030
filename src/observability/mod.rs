//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (lookup and request counters, latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets
//! - Request ID flows through tower-http into every request span
//! - Metrics are cheap (atomic increments) and safe to record without an exporter

pub mod logging;
pub mod metrics;
