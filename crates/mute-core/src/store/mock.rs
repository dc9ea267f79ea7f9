//! Mock maintenance store for testing.

use super::{MaintenanceStore, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// An in-memory maintenance store.
///
/// Besides holding sets, the mock counts `members` calls and can be told to
/// fail every call, which lets tests observe short-circuiting and fail-open
/// behaviour.
#[derive(Debug, Default)]
pub struct MockMaintenanceStore {
    /// Set name to members.
    sets: RwLock<HashMap<String, HashSet<String>>>,
    /// Error returned by every call while set.
    failure: RwLock<Option<StoreError>>,
    /// Number of `members` calls made.
    calls: AtomicU64,
}

impl MockMaintenanceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose every call fails with `error`.
    pub fn failing(error: StoreError) -> Self {
        Self {
            failure: RwLock::new(Some(error)),
            ..Self::default()
        }
    }

    /// Adds `member` to `set_name`, creating the set if needed.
    pub async fn add_member(&self, set_name: &str, member: impl Into<String>) {
        let mut sets = self.sets.write().await;
        sets.entry(set_name.to_string())
            .or_default()
            .insert(member.into());
    }

    /// Removes `member` from `set_name`. Returns whether it was present.
    pub async fn remove_member(&self, set_name: &str, member: &str) -> bool {
        let mut sets = self.sets.write().await;
        sets.get_mut(set_name)
            .map(|set| set.remove(member))
            .unwrap_or(false)
    }

    /// Makes subsequent calls fail with `error`, or succeed again with `None`.
    pub async fn set_failure(&self, error: Option<StoreError>) {
        *self.failure.write().await = error;
    }

    /// Number of `members` calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MaintenanceStore for MockMaintenanceStore {
    async fn members(&self, set_name: &str) -> Result<HashSet<String>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }

        let sets = self.sets.read().await;
        Ok(sets.get(set_name).cloned().unwrap_or_default())
    }
}
