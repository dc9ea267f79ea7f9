//! Explain command - shows what the mutator would do with an event.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

use mute_core::{mute, Event, MaintenanceStore, MuteError, MuteOutcome, Mutator};

use super::mutate::build_redis_mutator;
use super::OutputFormat;
use crate::config::Settings;

/// Result of explaining one event.
#[derive(Debug)]
pub struct Explanation {
    pub outcome: MuteOutcome,
    /// Why the decision failed, for `PassthroughOnError`.
    pub error: Option<String>,
    /// The event the mutate command would emit.
    pub event: Event,
}

/// Decides `event` without falling back silently, keeping the failure reason.
pub async fn explain_event<S: MaintenanceStore>(
    event: Event,
    mutator: Result<Mutator<S>, MuteError>,
) -> Explanation {
    let decision = match mutator {
        Ok(mutator) => mutator.decide(&event).await,
        Err(err) => Err(err),
    };

    match decision {
        Ok(outcome) if outcome.is_muted() => Explanation {
            outcome,
            error: None,
            event: mute(event),
        },
        Ok(outcome) => Explanation {
            outcome,
            error: None,
            event,
        },
        Err(err) => Explanation {
            outcome: MuteOutcome::PassthroughOnError,
            error: Some(err.to_string()),
            event,
        },
    }
}

fn describe(outcome: MuteOutcome) -> &'static str {
    match outcome {
        MuteOutcome::EnvironmentMuted => "client environment matches a non-production pattern",
        MuteOutcome::MaintenanceMuted => "a subscription or the client name is under maintenance",
        MuteOutcome::Passthrough => "no environment pattern or maintenance entry matched",
        MuteOutcome::PassthroughOnError => "the decision failed; the original event is emitted",
    }
}

pub async fn run_explain(settings: &Settings, input: Option<&Path>, format: OutputFormat) -> Result<()> {
    let raw = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file: {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw)
                .await
                .context("Failed to read event from stdin")?;
            raw
        }
    };
    let event = Event::from_json(&raw)?;

    let explanation = explain_event(event, build_redis_mutator(settings)).await;

    if format == OutputFormat::Json {
        let report = json!({
            "outcome": explanation.outcome.as_str(),
            "error": explanation.error,
            "event": explanation.event,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let label = match explanation.outcome {
        MuteOutcome::EnvironmentMuted | MuteOutcome::MaintenanceMuted => {
            explanation.outcome.as_str().yellow()
        }
        MuteOutcome::Passthrough => explanation.outcome.as_str().green(),
        MuteOutcome::PassthroughOnError => explanation.outcome.as_str().red(),
    };
    println!("{} {}", "Outcome:".bold(), label);
    println!("  {}", describe(explanation.outcome));
    if let Some(error) = &explanation.error {
        println!("  {} {}", "Error:".red(), error);
    }
    println!();
    println!("{}", "Emitted event".bold());
    println!("─────────────");
    println!("{}", serde_json::to_string_pretty(&explanation.event)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mute_core::{EnvironmentClassifier, MaintenanceResolver, MockMaintenanceStore, StoreError};

    fn event(environment: &str) -> Event {
        serde_json::from_value(json!({
            "client": {"name": "web1", "environment": environment},
            "check": {"name": "load", "subscribers": ["base"], "status": 1, "output": "high"}
        }))
        .unwrap()
    }

    fn mutator(store: MockMaintenanceStore) -> Result<Mutator<MockMaintenanceStore>, MuteError> {
        Ok(Mutator::new(
            EnvironmentClassifier::new(),
            MaintenanceResolver::new(store),
        ))
    }

    #[tokio::test]
    async fn test_explain_muted() {
        let explanation = explain_event(event("qa"), mutator(MockMaintenanceStore::new())).await;
        assert_eq!(explanation.outcome, MuteOutcome::EnvironmentMuted);
        assert!(explanation.event.is_mutated());
        assert!(explanation.error.is_none());
    }

    #[tokio::test]
    async fn test_explain_keeps_error_reason() {
        let store = MockMaintenanceStore::failing(StoreError::Query("NOAUTH".into()));
        let explanation = explain_event(event("prod"), mutator(store)).await;

        assert_eq!(explanation.outcome, MuteOutcome::PassthroughOnError);
        assert!(explanation.error.unwrap().contains("NOAUTH"));
        assert_eq!(explanation.event, event("prod"));
    }

    #[tokio::test]
    async fn test_explain_build_failure() {
        let explanation = explain_event::<MockMaintenanceStore>(
            event("prod"),
            Err(MuteError::Internal("configuration: broken".into())),
        )
        .await;
        assert_eq!(explanation.outcome, MuteOutcome::PassthroughOnError);
        assert!(explanation.error.unwrap().contains("broken"));
    }

    #[test]
    fn test_every_outcome_is_described() {
        for outcome in [
            MuteOutcome::EnvironmentMuted,
            MuteOutcome::MaintenanceMuted,
            MuteOutcome::Passthrough,
            MuteOutcome::PassthroughOnError,
        ] {
            assert!(!describe(outcome).is_empty());
        }
    }
}
