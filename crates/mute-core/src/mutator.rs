//! The mute decision driver.
//!
//! [`Mutator::process`] takes one parsed event and always hands back exactly
//! one event: either the original, or a copy rewritten into an OK result.
//!
//! ```text
//! Received ──► environment muted? ──yes──► EnvironmentMuted
//!                    │ no
//!                    ▼
//!              under maintenance? ──yes──► MaintenanceMuted
//!                    │ no        └─error─► PassthroughOnError
//!                    ▼
//!               Passthrough
//! ```

use std::fmt;
use tracing::{debug, warn};

use crate::environment::EnvironmentClassifier;
use crate::error::MuteError;
use crate::event::Event;
use crate::maintenance::MaintenanceResolver;
use crate::store::MaintenanceStore;

/// Terminal state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuteOutcome {
    /// Muted because the node's environment is non-production.
    EnvironmentMuted,
    /// Muted because a subscription or the node name is under maintenance.
    MaintenanceMuted,
    /// Not muted.
    Passthrough,
    /// The decision failed; the original event was emitted.
    PassthroughOnError,
}

impl MuteOutcome {
    /// Whether this outcome rewrote the event.
    pub fn is_muted(self) -> bool {
        matches!(self, MuteOutcome::EnvironmentMuted | MuteOutcome::MaintenanceMuted)
    }

    /// Stable snake_case name for logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            MuteOutcome::EnvironmentMuted => "environment_muted",
            MuteOutcome::MaintenanceMuted => "maintenance_muted",
            MuteOutcome::Passthrough => "passthrough",
            MuteOutcome::PassthroughOnError => "passthrough_on_error",
        }
    }
}

impl fmt::Display for MuteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The emitted event together with how it was decided.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub event: Event,
    pub outcome: MuteOutcome,
    /// `MuteError::kind` of the failure behind `PassthroughOnError`.
    pub error_kind: Option<&'static str>,
}

/// Rewrites `event` into a suppressed OK result.
///
/// Only `mutated`, `check.status` and `check.output` change.
pub fn mute(mut event: Event) -> Event {
    event.mark_mutated();
    event.check.output = format!(
        "OK: Check {} status suppressed due to maintenance or testing environment",
        event.check.name
    );
    event.check.status = 0;
    event
}

/// Runs the environment check, then the maintenance check, then mutes or
/// passes the event through.
#[derive(Debug, Clone)]
pub struct Mutator<S> {
    classifier: EnvironmentClassifier,
    resolver: MaintenanceResolver<S>,
}

impl<S: MaintenanceStore> Mutator<S> {
    /// Creates a mutator from its two collaborators.
    pub fn new(classifier: EnvironmentClassifier, resolver: MaintenanceResolver<S>) -> Self {
        Self {
            classifier,
            resolver,
        }
    }

    /// Decides the outcome for `event` without falling back on errors.
    ///
    /// Never returns `PassthroughOnError`; failures come back as `Err`.
    pub async fn decide(&self, event: &Event) -> Result<MuteOutcome, MuteError> {
        if self
            .classifier
            .is_muted_environment(event.client.environment())
        {
            return Ok(MuteOutcome::EnvironmentMuted);
        }

        let under_maintenance = self
            .resolver
            .is_under_maintenance(&event.check.subscribers, &event.client.name)
            .await?;

        Ok(if under_maintenance {
            MuteOutcome::MaintenanceMuted
        } else {
            MuteOutcome::Passthrough
        })
    }

    /// Processes one event, emitting the original on any decision failure.
    pub async fn process(&self, event: Event) -> Processed {
        let (outcome, error_kind) = match self.decide(&event).await {
            Ok(outcome) => (outcome, None),
            Err(err) => {
                warn!(
                    client = %event.client.name,
                    check = %event.check.name,
                    error_kind = err.kind(),
                    error = %err,
                    "Mute decision failed, emitting original event"
                );
                (MuteOutcome::PassthroughOnError, Some(err.kind()))
            }
        };

        debug!(
            client = %event.client.name,
            check = %event.check.name,
            %outcome,
            "Mute decision"
        );

        let event = if outcome.is_muted() {
            mute(event)
        } else {
            event
        };

        Processed {
            event,
            outcome,
            error_kind,
        }
    }
}
