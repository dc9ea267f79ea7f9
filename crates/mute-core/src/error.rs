//! Error taxonomy for the mute decision.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while deciding whether to mute an event.
///
/// Only `MalformedInput` is allowed to reach the process boundary. Once an
/// event has been parsed, every other variant is absorbed by the mutator, which
/// emits the original event instead.
#[derive(Error, Debug)]
pub enum MuteError {
    /// The input was not JSON or lacked a required field.
    #[error("Malformed input event: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// The maintenance store could not be reached or queried.
    #[error("Maintenance store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Any other failure while processing a parsed event.
    #[error("Unexpected internal error: {0}")]
    Internal(String),
}

impl MuteError {
    /// Short, stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MuteError::MalformedInput(_) => "malformed_input",
            MuteError::StoreUnavailable(_) => "store_unavailable",
            MuteError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: MuteError = StoreError::Connection("refused".to_string()).into();
        assert_eq!(err.kind(), "store_unavailable");
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_malformed_input_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MuteError::MalformedInput(json_err);
        assert_eq!(err.kind(), "malformed_input");
        assert!(err.to_string().starts_with("Malformed input event"));
    }
}
