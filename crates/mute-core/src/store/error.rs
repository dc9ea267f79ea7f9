//! Maintenance store error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reading the maintenance sets.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Failed to connect to the store backend.
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store did not answer within the configured bound.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered with an error.
    #[error("Store query failed: {0}")]
    Query(String),
}
