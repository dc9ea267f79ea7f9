//! Monitoring event model.
//!
//! Only the fields the mute decision reads or writes are typed. Everything else
//! the monitoring server put on the event is carried in `extra` maps and written
//! back out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MuteError;

/// Top-level key flagging a suppressed event.
pub const MUTATED_FIELD: &str = "mutated";

/// A check result as delivered to the mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The node that produced the result.
    pub client: Client,
    /// The check that was executed.
    pub check: Check,
    /// Any other top-level fields (id, action, occurrences, ...).
    ///
    /// `mutated` lives here too, so whatever the input carried under that key
    /// is written back verbatim unless the event gets muted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The reporting node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Node name.
    pub name: String,
    /// Remaining client attributes, including `environment`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The check definition and its latest result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Check name.
    pub name: String,
    /// Subscriptions the check is published to.
    pub subscribers: Vec<String>,
    /// Exit status; 0 is OK.
    pub status: i64,
    /// Human-readable result.
    pub output: String,
    /// Remaining check attributes (command, interval, handlers, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Parses an event from its JSON encoding.
    pub fn from_json(input: &str) -> Result<Self, MuteError> {
        serde_json::from_str(input).map_err(MuteError::MalformedInput)
    }

    /// Encodes the event as a single line of JSON.
    pub fn to_json(&self) -> Result<String, MuteError> {
        serde_json::to_string(self).map_err(|e| MuteError::Internal(e.to_string()))
    }

    /// Whether this event has been suppressed by the mutator.
    pub fn is_mutated(&self) -> bool {
        self.extra
            .get(MUTATED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Marks the event as suppressed.
    pub fn mark_mutated(&mut self) {
        self.extra.insert(MUTATED_FIELD.to_string(), Value::Bool(true));
    }
}

impl Client {
    /// Returns the declared environment when it is present and a string.
    ///
    /// Missing, `null` and non-string values all yield `None`.
    pub fn environment(&self) -> Option<&str> {
        self.extra.get("environment").and_then(Value::as_str)
    }
}
