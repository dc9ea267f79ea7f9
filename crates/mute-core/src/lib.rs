//! # mute-core
//!
//! Mute decision logic for monitoring events.
//!
//! This crate decides whether a check result should be suppressed because the
//! reporting node lives in a non-production environment or because its
//! subscriptions or name are listed in an operator-managed maintenance set.
//! Suppressed events are rewritten into a benign OK result; everything else is
//! passed through untouched.

pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod maintenance;
pub mod mutator;
pub mod store;

pub use config::{load_config, ConfigError, MutatorConfig};
pub use environment::EnvironmentClassifier;
pub use error::MuteError;
pub use event::{Check, Client, Event};
pub use maintenance::{MaintenanceKeys, MaintenanceResolver, WILDCARD_MEMBER};
pub use mutator::{mute, MuteOutcome, Mutator, Processed};
pub use store::{MaintenanceStore, MockMaintenanceStore, RedisMaintenanceStore, StoreError};
