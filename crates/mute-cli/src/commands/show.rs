//! Show command - prints the current maintenance sets.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::collections::HashSet;

use mute_core::{MaintenanceKeys, MaintenanceStore, RedisMaintenanceStore, WILDCARD_MEMBER};

use super::OutputFormat;
use crate::config::Settings;

/// Snapshot of both maintenance sets, sorted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceSnapshot {
    pub keys: MaintenanceKeys,
    pub subscriptions: Vec<String>,
    pub names: Vec<String>,
}

impl MaintenanceSnapshot {
    /// Whether either set holds the wildcard, muting every event.
    pub fn mutes_everything(&self) -> bool {
        self.subscriptions.iter().any(|s| s == WILDCARD_MEMBER)
            || self.names.iter().any(|n| n == WILDCARD_MEMBER)
    }
}

fn sorted(set: HashSet<String>) -> Vec<String> {
    let mut members: Vec<String> = set.into_iter().collect();
    members.sort();
    members
}

/// Reads both maintenance sets from `store`.
pub async fn snapshot<S: MaintenanceStore>(
    store: &S,
    keys: MaintenanceKeys,
) -> Result<MaintenanceSnapshot> {
    let subscriptions = store
        .members(&keys.subscriptions)
        .await
        .with_context(|| format!("Failed to read {}", keys.subscriptions))?;
    let names = store
        .members(&keys.names)
        .await
        .with_context(|| format!("Failed to read {}", keys.names))?;

    Ok(MaintenanceSnapshot {
        keys,
        subscriptions: sorted(subscriptions),
        names: sorted(names),
    })
}

fn print_set(title: &str, key: &str, members: &[String]) {
    println!("{} ({})", title.bold(), key.cyan());
    if members.is_empty() {
        println!("  (empty)");
    }
    for member in members {
        if member == WILDCARD_MEMBER {
            println!("  - {} {}", member.red().bold(), "(matches everything)".red());
        } else {
            println!("  - {}", member);
        }
    }
}

pub async fn run_show(settings: &Settings, format: OutputFormat) -> Result<()> {
    let config = settings.load().context("Failed to load configuration")?;
    let store = RedisMaintenanceStore::new(config.redis_store_config());
    let snapshot = snapshot(&store, config.maintenance_keys()).await?;

    if format == OutputFormat::Json {
        let mutes_everything = snapshot.mutes_everything();
        let report = json!({
            "sets": {
                "subscriptions": {"key": snapshot.keys.subscriptions, "members": snapshot.subscriptions},
                "names": {"key": snapshot.keys.names, "members": snapshot.names},
            },
            "mutes_everything": mutes_everything,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_set(
        "Subscriptions under maintenance",
        &snapshot.keys.subscriptions,
        &snapshot.subscriptions,
    );
    println!();
    print_set("Nodes under maintenance", &snapshot.keys.names, &snapshot.names);

    if snapshot.mutes_everything() {
        println!();
        println!(
            "{}",
            "Wildcard present: every event is currently muted.".yellow().bold()
        );
    }

    Ok(())
}
