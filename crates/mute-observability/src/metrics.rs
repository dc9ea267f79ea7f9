//! Decision metrics for the maintenance mutator.
//!
//! Counters are recorded through the `metrics` facade. No exporter is installed
//! here; without a global recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::sync::Once;
use std::time::Duration;

/// Events processed, labelled by outcome.
pub const EVENTS_TOTAL: &str = "mutator_events_total";
/// Decision failures, labelled by error kind.
pub const ERRORS_TOTAL: &str = "mutator_errors_total";
/// Time spent deciding one event.
pub const DECISION_DURATION: &str = "mutator_decision_duration_seconds";

/// Records mutator decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutatorMetrics;

impl MutatorMetrics {
    /// Creates the collector, registering metric descriptions once per process.
    pub fn new() -> Self {
        static REGISTER: Once = Once::new();
        REGISTER.call_once(Self::register_metrics);
        Self
    }

    fn register_metrics() {
        describe_counter!(EVENTS_TOTAL, "Total number of events processed, by outcome");
        describe_counter!(ERRORS_TOTAL, "Total number of failed mute decisions, by kind");
        describe_histogram!(DECISION_DURATION, "Time taken to decide one event");
    }

    /// Records the terminal outcome of one event.
    pub fn record_outcome(&self, outcome: &str) {
        counter!(EVENTS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    }

    /// Records a decision failure.
    pub fn record_error(&self, kind: &str) {
        counter!(ERRORS_TOTAL, "kind" => kind.to_string()).increment(1);
    }

    /// Records how long a decision took.
    pub fn record_duration(&self, elapsed: Duration) {
        histogram!(DECISION_DURATION).record(elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = MutatorMetrics::new();
        metrics.record_outcome("passthrough");
        metrics.record_error("store_unavailable");
        metrics.record_duration(Duration::from_millis(3));
    }

    #[test]
    fn test_new_is_idempotent() {
        let _ = MutatorMetrics::new();
        let _ = MutatorMetrics::new();
    }
}
