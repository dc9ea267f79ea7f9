//! # mute-observability
//!
//! Logging and metrics for the maintenance mutator.
//!
//! The mutator's stdout is the event channel, so every log line produced here
//! goes to stderr.

pub mod logging;
pub mod metrics;

pub use self::logging::{init_logging_with_config, LoggingConfig};
pub use self::metrics::MutatorMetrics;
