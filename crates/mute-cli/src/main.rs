//! Maintenance Mutator CLI
//!
//! Reads one monitoring event on stdin and writes one event on stdout, muting
//! checks from non-production environments and from nodes or subscriptions
//! under maintenance.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{build_redis_mutator, run_explain, run_mutate, run_show, run_validate, OutputFormat};
use config::{default_config_path, Settings};
use mute_observability::{init_logging_with_config, LoggingConfig, MutatorMetrics};

#[derive(Parser)]
#[command(name = "maintenance-mutator")]
#[command(author = "Maintenance Mutator Contributors")]
#[command(version)]
#[command(
    about = "Suppresses monitoring events from test environments and nodes under maintenance",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MUTE_CONFIG")]
    config: Option<PathBuf>,

    /// Redis URL for the maintenance sets (overrides the configuration file)
    #[arg(long, value_name = "URL", env = "MUTE_REDIS_URL")]
    redis_url: Option<String>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log format on stderr (text, json)
    #[arg(long, default_value = "text")]
    log_format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read an event from stdin and write the (possibly muted) event to stdout
    Mutate,

    /// Show what would happen to an event, with the reason
    Explain {
        /// Event file (defaults to stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the current members of the maintenance sets
    Show {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate configuration
    Validate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging_with_config(LoggingConfig {
        level: if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        },
        json_format: cli.log_format == OutputFormat::Json,
        ..Default::default()
    });

    let settings = Settings::new(
        cli.config.clone().unwrap_or_else(default_config_path),
        cli.redis_url.clone(),
    );

    match cli.command.unwrap_or(Commands::Mutate) {
        Commands::Mutate => {
            let metrics = MutatorMetrics::new();
            run_mutate(
                tokio::io::stdin(),
                tokio::io::stdout(),
                || build_redis_mutator(&settings),
                &metrics,
            )
            .await?;
            Ok(())
        }
        Commands::Explain { input, format } => {
            run_explain(&settings, input.as_deref(), format).await
        }
        Commands::Show { format } => run_show(&settings, format).await,
        Commands::Validate => run_validate(&settings).await,
    }
}
