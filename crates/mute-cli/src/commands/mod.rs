//! Subcommand implementations.

pub mod explain;
pub mod mutate;
pub mod show;
pub mod validate;

pub use explain::run_explain;
pub use mutate::{build_redis_mutator, run_mutate};
pub use show::run_show;
pub use validate::run_validate;

/// Output format for the inspection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}
