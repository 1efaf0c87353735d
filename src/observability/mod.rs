//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Discovery and serving produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//!
//! Consumers:
//!     → Log aggregation (stderr, pretty or JSON)
//!     → Whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
