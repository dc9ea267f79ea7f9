//! Mutate command - reads one event, decides, writes one event.

use anyhow::{Context, Result};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use mute_core::{
    Event, MaintenanceResolver, MaintenanceStore, MuteError, MuteOutcome, Mutator, Processed,
    RedisMaintenanceStore,
};
use mute_observability::MutatorMetrics;

use crate::config::Settings;

/// Builds the production mutator from configuration.
///
/// Only configuration problems fail here. The store connects on first use, so
/// a bad or unreachable Redis only matters for events that get past the
/// environment check, and it surfaces there as `StoreUnavailable`.
pub fn build_redis_mutator(settings: &Settings) -> Result<Mutator<RedisMaintenanceStore>, MuteError> {
    let config = settings
        .load()
        .map_err(|e| MuteError::Internal(format!("configuration: {}", e)))?;
    let classifier = config
        .classifier()
        .map_err(|e| MuteError::Internal(format!("configuration: {}", e)))?;
    let store = RedisMaintenanceStore::new(config.redis_store_config());

    Ok(Mutator::new(
        classifier,
        MaintenanceResolver::with_keys(store, config.maintenance_keys()),
    ))
}

/// Reads and parses the single input event.
pub async fn read_event<R>(input: &mut R, metrics: &MutatorMetrics) -> Result<Event>
where
    R: AsyncRead + Unpin,
{
    let mut raw = String::new();
    input
        .read_to_string(&mut raw)
        .await
        .context("Failed to read event from input")?;

    Event::from_json(&raw).map_err(|err| {
        error!(error = %err, "Rejecting input event");
        metrics.record_error(err.kind());
        anyhow::Error::new(err)
    })
}

/// Decides the event with the mutator produced by `build`.
///
/// A failure to build the mutator is absorbed the same way as a failed
/// decision: the original event comes back with `PassthroughOnError`.
pub async fn decide_event<S, F>(event: Event, build: F, metrics: &MutatorMetrics) -> Processed
where
    S: MaintenanceStore,
    F: FnOnce() -> Result<Mutator<S>, MuteError>,
{
    let started = Instant::now();

    let processed = match build() {
        Ok(mutator) => mutator.process(event).await,
        Err(err) => {
            warn!(
                client = %event.client.name,
                check = %event.check.name,
                error_kind = err.kind(),
                error = %err,
                "Mutator unavailable, emitting original event"
            );
            Processed {
                event,
                outcome: MuteOutcome::PassthroughOnError,
                error_kind: Some(err.kind()),
            }
        }
    };

    metrics.record_duration(started.elapsed());
    metrics.record_outcome(processed.outcome.as_str());
    if let Some(kind) = processed.error_kind {
        metrics.record_error(kind);
    }
    processed
}

/// Runs the whole step: exactly one event in, exactly one event out.
///
/// Only unreadable or malformed input returns an error, and in that case
/// nothing is written to `output`.
pub async fn run_mutate<R, W, S, F>(
    mut input: R,
    mut output: W,
    build: F,
    metrics: &MutatorMetrics,
) -> Result<MuteOutcome>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: MaintenanceStore,
    F: FnOnce() -> Result<Mutator<S>, MuteError>,
{
    let event = read_event(&mut input, metrics).await?;
    let processed = decide_event(event, build, metrics).await;

    let mut line = processed.event.to_json()?;
    line.push('\n');
    output
        .write_all(line.as_bytes())
        .await
        .context("Failed to write event to output")?;
    output.flush().await.context("Failed to flush output")?;

    info!(
        client = %processed.event.client.name,
        check = %processed.event.check.name,
        outcome = %processed.outcome,
        "Event emitted"
    );

    Ok(processed.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mute_core::{EnvironmentClassifier, MockMaintenanceStore, StoreError};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn raw_event(environment: &str) -> String {
        json!({
            "client": {"name": "web1", "environment": environment},
            "check": {
                "name": "disk_usage",
                "subscribers": ["base"],
                "status": 2,
                "output": "WARNING"
            }
        })
        .to_string()
    }

    fn mock_mutator(
        store: Arc<MockMaintenanceStore>,
    ) -> impl FnOnce() -> Result<Mutator<Arc<MockMaintenanceStore>>, MuteError> {
        move || {
            Ok(Mutator::new(
                EnvironmentClassifier::new(),
                MaintenanceResolver::new(store),
            ))
        }
    }

    async fn run(input: &str, store: Arc<MockMaintenanceStore>) -> (Result<MuteOutcome>, Vec<u8>) {
        let mut output = Vec::new();
        let result = run_mutate(
            input.as_bytes(),
            &mut output,
            mock_mutator(store),
            &MutatorMetrics::new(),
        )
        .await;
        (result, output)
    }

    #[tokio::test]
    async fn test_emits_one_muted_event() {
        let (result, output) = run(&raw_event("dev"), Arc::new(MockMaintenanceStore::new())).await;

        assert_eq!(result.unwrap(), MuteOutcome::EnvironmentMuted);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 1);
        let out: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(out["mutated"], json!(true));
        assert_eq!(out["check"]["status"], json!(0));
    }

    #[tokio::test]
    async fn test_passthrough_is_identical() {
        let input = raw_event("prod");
        let (result, output) = run(&input, Arc::new(MockMaintenanceStore::new())).await;

        assert_eq!(result.unwrap(), MuteOutcome::Passthrough);
        let out: Value = serde_json::from_slice(&output).unwrap();
        let original: Value = serde_json::from_str(&input).unwrap();
        assert_eq!(out, original);
    }

    #[tokio::test]
    async fn test_store_failure_still_emits() {
        let store = Arc::new(MockMaintenanceStore::failing(StoreError::Connection(
            "refused".into(),
        )));
        let input = raw_event("prod");
        let (result, output) = run(&input, store).await;

        assert_eq!(result.unwrap(), MuteOutcome::PassthroughOnError);
        let out: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(out, serde_json::from_str::<Value>(&input).unwrap());
    }

    #[tokio::test]
    async fn test_build_failure_still_emits() {
        let input = raw_event("prod");
        let mut output = Vec::new();
        let outcome = run_mutate(
            input.as_bytes(),
            &mut output,
            || -> Result<Mutator<MockMaintenanceStore>, MuteError> {
                Err(MuteError::Internal("configuration: bad".into()))
            },
            &MutatorMetrics::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, MuteOutcome::PassthroughOnError);
        let out: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(out, serde_json::from_str::<Value>(&input).unwrap());
    }

    #[tokio::test]
    async fn test_malformed_input_writes_nothing() {
        let (result, output) = run("{\"client\":", Arc::new(MockMaintenanceStore::new())).await;
        assert!(result.is_err());
        assert!(output.is_empty());

        let (result, output) = run(
            "{\"client\":{\"name\":\"web1\"},\"check\":{\"name\":\"x\"}}",
            Arc::new(MockMaintenanceStore::new()),
        )
        .await;
        assert!(result.is_err());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_decide_reports_error_kind() {
        let metrics = MutatorMetrics::new();
        let store = Arc::new(MockMaintenanceStore::failing(StoreError::Timeout(
            std::time::Duration::from_millis(50),
        )));
        let event = Event::from_json(&raw_event("prod")).unwrap();

        let processed = decide_event(event.clone(), mock_mutator(store), &metrics).await;
        assert_eq!(processed.outcome, MuteOutcome::PassthroughOnError);
        assert_eq!(processed.error_kind, Some("store_unavailable"));

        let processed = decide_event(
            event.clone(),
            || -> Result<Mutator<MockMaintenanceStore>, MuteError> {
                Err(MuteError::Internal("configuration: bad".into()))
            },
            &metrics,
        )
        .await;
        assert_eq!(processed.outcome, MuteOutcome::PassthroughOnError);
        assert_eq!(processed.error_kind, Some("internal"));
        assert_eq!(processed.event, event);

        let processed = decide_event(
            event,
            mock_mutator(Arc::new(MockMaintenanceStore::new())),
            &metrics,
        )
        .await;
        assert_eq!(processed.outcome, MuteOutcome::Passthrough);
        assert_eq!(processed.error_kind, None);
    }

    #[tokio::test]
    async fn test_bad_store_url_still_mutes_staging() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(
            dir.path().join("missing.yaml"),
            Some("not a url".to_string()),
        );

        let mut output = Vec::new();
        let outcome = run_mutate(
            raw_event("staging").as_bytes(),
            &mut output,
            || build_redis_mutator(&settings),
            &MutatorMetrics::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, MuteOutcome::EnvironmentMuted);
        let out: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(out["mutated"], json!(true));
        assert_eq!(out["check"]["status"], json!(0));
    }

    #[tokio::test]
    async fn test_bad_store_url_fails_open_for_production() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(
            dir.path().join("missing.yaml"),
            Some("not a url".to_string()),
        );

        let event = Event::from_json(&raw_event("prod")).unwrap();
        let processed = decide_event(
            event.clone(),
            || build_redis_mutator(&settings),
            &MutatorMetrics::new(),
        )
        .await;

        assert_eq!(processed.outcome, MuteOutcome::PassthroughOnError);
        assert_eq!(processed.error_kind, Some("store_unavailable"));
        assert_eq!(processed.event, event);
    }

    #[tokio::test]
    #[ignore]
    async fn test_build_from_unreachable_redis_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "store:\n  url: redis://127.0.0.1:1\n  connect_timeout_ms: 200\n  query_timeout_ms: 200\n",
        )
        .unwrap();
        let settings = Settings::new(path, None);

        let input = raw_event("prod");
        let mut output = Vec::new();
        let outcome = run_mutate(
            input.as_bytes(),
            &mut output,
            || build_redis_mutator(&settings),
            &MutatorMetrics::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, MuteOutcome::PassthroughOnError);
        let out: Value = serde_json::from_slice(&output).unwrap();
        assert!(out.get("mutated").is_none());
    }
}
