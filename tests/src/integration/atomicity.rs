//! # Commit Failure Injection
//!
//! A purchase moves three records in one batch; these tests inject a
//! backend failure at the commit and check that nothing is partially
//! applied and nothing reaches the bus.

use shared_types::storage::{
    BatchOperation, MemoryStateStore, StateStore, StateStoreError, VersionEntry,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Delegates to [`MemoryStateStore`] but refuses commits while armed.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStateStore,
    fail_commits: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to arm and disarm commit failures.
    pub fn trigger(&self) -> Arc<AtomicBool> {
        self.fail_commits.clone()
    }
}

impl StateStore for FailingStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateStoreError> {
        self.inner.get(key)
    }

    fn range_scan(
        &self,
        start: &[u8],
        end: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateStoreError> {
        self.inner.range_scan(start, end)
    }

    fn history_of(&self, key: &[u8]) -> Result<Vec<VersionEntry>, StateStoreError> {
        self.inner.history_of(key)
    }

    fn atomic_commit(&mut self, ops: Vec<BatchOperation>) -> Result<(), StateStoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StateStoreError::Backend("injected commit failure".to_string()));
        }
        self.inner.atomic_commit(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_01_user_registry::UserRegistry;
    use ac_02_asset_registry::AssetRegistry;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::caller::Caller;
    use shared_types::entities::{AssetStatus, UserRole};
    use shared_types::errors::LedgerError;
    use shared_types::storage::shared_store;
    use shared_types::time::ManualClock;

    #[tokio::test]
    async fn test_failed_buy_commit_leaves_no_trace() {
        crate::init_tracing();
        let failing = FailingStore::new();
        let trigger = failing.trigger();
        let store = shared_store(failing);
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = ManualClock::at(1_000);

        let users = UserRegistry::new(store.clone(), bus.clone(), clock.clone());
        users.create("alice", "Alice A.", UserRole::User).await.unwrap();
        users.create("bob", "Bob B.", UserRole::User).await.unwrap();
        users
            .mint_credits(&Caller::admin("root"), "bob", 500)
            .await
            .unwrap();

        let assets = AssetRegistry::new(store, bus.clone(), clock.clone());
        assets
            .create(
                &Caller::user("alice"),
                "a1",
                "Printing press",
                "equipment",
                "alice",
                AssetStatus::Available,
                "",
                "",
            )
            .await
            .unwrap();
        assets
            .list_for_sale(&Caller::user("alice"), "a1", 200)
            .await
            .unwrap();

        let published = bus.events_published();
        trigger.store(true, std::sync::atomic::Ordering::SeqCst);

        let err = assets.buy(&Caller::user("bob"), "a1", "bob").await.unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));

        // None of the three records moved, and the bus heard nothing.
        assert_eq!(users.read("bob").unwrap().balance, 500);
        assert_eq!(users.read("alice").unwrap().balance, 0);
        let asset = assets.read("a1").unwrap();
        assert_eq!(asset.owner, "alice");
        assert_eq!(asset.status, AssetStatus::ForSale);
        assert_eq!(asset.price, 200);
        assert_eq!(bus.events_published(), published);

        // Disarmed, the same purchase goes through.
        trigger.store(false, std::sync::atomic::Ordering::SeqCst);
        let bought = assets.buy(&Caller::user("bob"), "a1", "bob").await.unwrap();
        assert_eq!(bought.owner, "bob");
        assert_eq!(users.read("bob").unwrap().balance, 300);
        assert_eq!(bus.events_published(), published + 3);
    }

    #[tokio::test]
    async fn test_failed_create_emits_nothing() {
        crate::init_tracing();
        let failing = FailingStore::new();
        let trigger = failing.trigger();
        let store = shared_store(failing);
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = ManualClock::at(1_000);

        let users = UserRegistry::new(store.clone(), bus.clone(), clock.clone());
        users.create("alice", "Alice A.", UserRole::User).await.unwrap();

        let assets = AssetRegistry::new(store, bus.clone(), clock);
        trigger.store(true, std::sync::atomic::Ordering::SeqCst);

        let published = bus.events_published();
        let err = assets
            .create(
                &Caller::user("alice"),
                "a1",
                "Widget",
                "misc",
                "alice",
                AssetStatus::Available,
                "",
                "",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(bus.events_published(), published);

        trigger.store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(matches!(
            assets.read("a1").unwrap_err(),
            LedgerError::NotFound { .. }
        ));
    }
}
