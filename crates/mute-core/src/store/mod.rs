//! Read-only access to the maintenance sets.
//!
//! This module provides a `MaintenanceStore` trait over a set-membership
//! backend. Operators add subscriptions or node names to the maintenance sets
//! with their own tooling; the mutator only ever reads them.
//!
//! # Example
//!
//! ```ignore
//! use mute_core::store::{MaintenanceStore, MockMaintenanceStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mute_core::StoreError> {
//!     let store = MockMaintenanceStore::new();
//!     store.add_member("maintenance:names", "web1").await;
//!
//!     let names = store.members("maintenance:names").await?;
//!     assert!(names.contains("web1"));
//!     Ok(())
//! }
//! ```

mod error;
mod mock;
mod redis;

pub use self::redis::{RedisMaintenanceStore, RedisStoreConfig};
pub use error::StoreError;
pub use mock::MockMaintenanceStore;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// A backend that can list the members of a named set.
///
/// Implementations must be thread-safe (`Send + Sync`) so a single client can be
/// shared by concurrent invocations.
#[async_trait]
pub trait MaintenanceStore: Send + Sync + 'static {
    /// Returns the members of `set_name`.
    ///
    /// A set that has never been created is returned as an empty set, not an
    /// error.
    async fn members(&self, set_name: &str) -> Result<HashSet<String>, StoreError>;
}

#[async_trait]
impl<S: MaintenanceStore + ?Sized> MaintenanceStore for Arc<S> {
    async fn members(&self, set_name: &str) -> Result<HashSet<String>, StoreError> {
        (**self).members(set_name).await
    }
}
