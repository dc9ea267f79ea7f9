//! Maintenance-set membership checks.

use std::collections::HashSet;

use crate::store::{MaintenanceStore, StoreError};

/// Member that matches every subscription or node name.
///
/// It is added to the event's own candidates before intersecting, so an
/// operator who puts `all` into either maintenance set mutes every event.
pub const WILDCARD_MEMBER: &str = "all";

/// Names of the two maintenance sets in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceKeys {
    /// Set of subscriptions under maintenance.
    pub subscriptions: String,
    /// Set of node names under maintenance.
    pub names: String,
}

impl Default for MaintenanceKeys {
    fn default() -> Self {
        Self {
            subscriptions: "maintenance:subscriptions".to_string(),
            names: "maintenance:names".to_string(),
        }
    }
}

/// Decides whether a check is under maintenance.
#[derive(Debug, Clone)]
pub struct MaintenanceResolver<S> {
    store: S,
    keys: MaintenanceKeys,
}

impl<S: MaintenanceStore> MaintenanceResolver<S> {
    /// Creates a resolver reading the default set names.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, MaintenanceKeys::default())
    }

    /// Creates a resolver reading custom set names.
    pub fn with_keys(store: S, keys: MaintenanceKeys) -> Self {
        Self { store, keys }
    }

    /// Returns true if any of `subscribers` or `client_name` is under
    /// maintenance.
    ///
    /// Both sets are fetched concurrently. Any store failure is returned to
    /// the caller untouched.
    pub async fn is_under_maintenance(
        &self,
        subscribers: &[String],
        client_name: &str,
    ) -> Result<bool, StoreError> {
        let candidate_subs: HashSet<&str> = subscribers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(WILDCARD_MEMBER))
            .collect();
        let candidate_names: HashSet<&str> = [client_name, WILDCARD_MEMBER].into_iter().collect();

        let (maint_subs, maint_names) = tokio::try_join!(
            self.store.members(&self.keys.subscriptions),
            self.store.members(&self.keys.names),
        )?;

        Ok(intersects(&candidate_subs, &maint_subs) || intersects(&candidate_names, &maint_names))
    }
}

fn intersects(candidates: &HashSet<&str>, maintenance: &HashSet<String>) -> bool {
    maintenance.iter().any(|m| candidates.contains(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockMaintenanceStore;

    fn subs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn resolver_with(
        subscriptions: &[&str],
        names: &[&str],
    ) -> MaintenanceResolver<MockMaintenanceStore> {
        let store = MockMaintenanceStore::new();
        for s in subscriptions {
            store.add_member("maintenance:subscriptions", *s).await;
        }
        for n in names {
            store.add_member("maintenance:names", *n).await;
        }
        MaintenanceResolver::new(store)
    }

    #[tokio::test]
    async fn test_empty_sets_do_not_mute() {
        let resolver = resolver_with(&[], &[]).await;
        assert!(!resolver
            .is_under_maintenance(&subs(&["base"]), "web1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_subscription_match() {
        let resolver = resolver_with(&["web"], &[]).await;
        assert!(resolver
            .is_under_maintenance(&subs(&["base", "web"]), "web1")
            .await
            .unwrap());
        assert!(!resolver
            .is_under_maintenance(&subs(&["base"]), "web1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_name_match_alone_is_enough() {
        let resolver = resolver_with(&["db"], &["web1"]).await;
        assert!(resolver
            .is_under_maintenance(&subs(&["base"]), "web1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_in_subscriptions_mutes_everything() {
        let resolver = resolver_with(&["all"], &[]).await;
        assert!(resolver
            .is_under_maintenance(&subs(&["anything"]), "any-node")
            .await
            .unwrap());
        assert!(resolver.is_under_maintenance(&[], "any-node").await.unwrap());
    }

    #[tokio::test]
    async fn test_wildcard_in_names_mutes_everything() {
        let resolver = resolver_with(&[], &["all"]).await;
        assert!(resolver
            .is_under_maintenance(&subs(&["base"]), "db7")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_sets_are_not_cross_matched() {
        // A node name listed as a subscription must not mute that node.
        let resolver = resolver_with(&["web1"], &["base"]).await;
        assert!(!resolver
            .is_under_maintenance(&subs(&["db"]), "web2")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_custom_keys() {
        let store = MockMaintenanceStore::new();
        store.add_member("ops:maint:names", "web1").await;
        let resolver = MaintenanceResolver::with_keys(
            store,
            MaintenanceKeys {
                subscriptions: "ops:maint:subs".to_string(),
                names: "ops:maint:names".to_string(),
            },
        );
        assert!(resolver
            .is_under_maintenance(&subs(&["base"]), "web1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MockMaintenanceStore::failing(StoreError::Connection("refused".into()));
        let resolver = MaintenanceResolver::new(store);
        let err = resolver
            .is_under_maintenance(&subs(&["base"]), "web1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
