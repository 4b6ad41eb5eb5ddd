//! Telemetry module for logging and metrics.
//!
//! Provides:
//! - Logging configuration and initialization
//! - Per-client exchange counters

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig};
pub(crate) use logging::{is_known_format, is_known_level};
pub use metrics::{ClientMetrics, Counter};
