//! Validate command - loads the configuration and reports problems.

use anyhow::{bail, Result};
use colored::Colorize;

use mute_core::{MutatorConfig, RedisMaintenanceStore};

use crate::config::Settings;

fn print_summary(config: &MutatorConfig) {
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Store: {}", config.store.url);
    println!(
        "  Timeouts: connect {}ms, query {}ms",
        config.store.connect_timeout_ms, config.store.query_timeout_ms
    );
    println!(
        "  Maintenance sets: {}, {}",
        config.maintenance.subscriptions_key, config.maintenance.names_key
    );
    match config.classifier() {
        Ok(classifier) => {
            let patterns: Vec<&str> = classifier.patterns().collect();
            println!("  Environment patterns: {}", patterns.join(", "));
        }
        Err(e) => println!("  Environment patterns: {}", e.to_string().red()),
    }
}

pub async fn run_validate(settings: &Settings) -> Result<()> {
    let path = settings.config_path();
    println!(
        "Validating configuration: {}",
        path.display().to_string().cyan()
    );
    if !path.exists() {
        println!("{}", "File not found, defaults apply.".yellow());
    }

    let config = match settings.load() {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {}", "Configuration error".red().bold(), e);
            bail!("configuration is invalid");
        }
    };

    println!();
    print_summary(&config);
    println!();

    // An unreachable store only makes the mutator fail open, so it is not fatal.
    let store = RedisMaintenanceStore::new(config.redis_store_config());
    match store.ping().await {
        Ok(()) => println!("  Store connectivity: {}", "ok".green()),
        Err(e) => println!("  Store connectivity: {}", e.to_string().yellow()),
    }
    println!();
    println!("{}", "Configuration is valid.".green().bold());
    Ok(())
}
