//! # Integration Test Flows
//!
//! Full lifecycles spanning the user registry, asset registry, and
//! transfer coordinator over one shared authoritative store and one bus:
//!
//! 1. **Marketplace**: register → mint → issue → list → buy, with balances
//!    settling atomically.
//! 2. **Two-signature transfer**: initiate → approve, plus the reject,
//!    expiry, and invalidation branches.
//! 3. **Serialization**: concurrent mutations of one asset commit with
//!    strictly increasing sequences and no lost updates.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ac_01_user_registry::UserRegistry;
    use ac_02_asset_registry::AssetRegistry;
    use ac_03_transfer_coordinator::TransferCoordinator;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::caller::Caller;
    use shared_types::entities::{
        AssetStatus, TransferStatus, UserRole, TRANSFER_TTL_SECS,
    };
    use shared_types::errors::{EntityKind, LedgerError};
    use shared_types::storage::{shared_store, MemoryStateStore};
    use shared_types::time::{ManualClock, TimeSource};

    struct World {
        bus: Arc<InMemoryEventBus>,
        clock: ManualClock,
        users: UserRegistry<MemoryStateStore, ManualClock>,
        assets: AssetRegistry<MemoryStateStore, ManualClock>,
        transfers: TransferCoordinator<MemoryStateStore, ManualClock>,
    }

    /// All three services over one store and bus, with `alice` and `bob`
    /// registered.
    async fn world() -> World {
        crate::init_tracing();
        let store = shared_store(MemoryStateStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = ManualClock::at(1_000);

        let users = UserRegistry::new(store.clone(), bus.clone(), clock.clone());
        users.create("alice", "Alice A.", UserRole::User).await.unwrap();
        users.create("bob", "Bob B.", UserRole::User).await.unwrap();

        let assets = AssetRegistry::new(store.clone(), bus.clone(), clock.clone());
        let transfers = TransferCoordinator::new(store, bus.clone(), clock.clone());
        World { bus, clock, users, assets, transfers }
    }

    async fn issue(world: &World, id: &str, owner: &str) {
        world
            .assets
            .create(
                &Caller::user(owner),
                id,
                "Printing press",
                "equipment",
                owner,
                AssetStatus::Available,
                "ipfs://meta/1",
                "deadbeef",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_marketplace_lifecycle_settles_balances() {
        let w = world().await;
        w.users
            .mint_credits(&Caller::admin("root"), "bob", 1_000)
            .await
            .unwrap();
        issue(&w, "a1", "alice").await;

        w.assets
            .list_for_sale(&Caller::user("alice"), "a1", 400)
            .await
            .unwrap();
        let bought = w.assets.buy(&Caller::user("bob"), "a1", "bob").await.unwrap();

        assert_eq!(bought.owner, "bob");
        assert_eq!(bought.status, AssetStatus::Owned);
        assert_eq!(bought.price, 0);
        assert_eq!(w.users.read("bob").unwrap().balance, 600);
        assert_eq!(w.users.read("alice").unwrap().balance, 400);

        // The asset is no longer purchasable.
        let err = w.assets.buy(&Caller::user("alice"), "a1", "alice").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_two_signature_transfer_end_to_end() {
        let w = world().await;
        issue(&w, "a1", "alice").await;

        let opened = w
            .transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();
        assert_eq!(opened.approvals.len(), 1);
        assert_eq!(w.transfers.all_pending_transfers().unwrap().len(), 1);

        w.clock.advance(60);
        let executed = w.transfers.approve(&Caller::user("bob"), "a1").await.unwrap();
        assert_eq!(executed.status, TransferStatus::Executed);
        assert_eq!(executed.executed_at, Some(1_060));

        let asset = w.assets.read("a1").unwrap();
        assert_eq!(asset.owner, "bob");
        assert_eq!(asset.sequence, 2);
        assert!(w.transfers.all_pending_transfers().unwrap().is_empty());

        // Bob can immediately open a transfer back.
        let back = w
            .transfers
            .initiate(&Caller::user("bob"), "a1", "alice")
            .await
            .unwrap();
        assert_eq!(back.current_owner, "bob");
    }

    #[tokio::test]
    async fn test_rejected_transfer_leaves_ownership_alone() {
        let w = world().await;
        issue(&w, "a1", "alice").await;
        w.transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();

        w.transfers
            .reject(&Caller::user("alice"), "a1", "listed it instead")
            .await
            .unwrap();

        assert_eq!(w.assets.read("a1").unwrap().owner, "alice");
        assert_eq!(
            w.transfers.pending_transfer("a1").unwrap().status,
            TransferStatus::Rejected
        );
        // The rejected record does not block a marketplace sale.
        w.assets
            .list_for_sale(&Caller::user("alice"), "a1", 100)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_transfer_then_fresh_initiate() {
        let w = world().await;
        issue(&w, "a1", "alice").await;
        w.transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();

        w.clock.advance(TRANSFER_TTL_SECS + 1);
        let err = w.transfers.approve(&Caller::user("bob"), "a1").await.unwrap_err();
        assert!(matches!(err, LedgerError::Expired { .. }));

        // The expired record no longer blocks; a new window opens.
        let fresh = w
            .transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();
        assert_eq!(fresh.status, TransferStatus::Pending);
        assert_eq!(fresh.expires_at, w.clock.now() + TRANSFER_TTL_SECS);
    }

    #[tokio::test]
    async fn test_sale_under_pending_transfer_invalidates_it() {
        let w = world().await;
        w.users
            .mint_credits(&Caller::admin("root"), "bob", 1_000)
            .await
            .unwrap();
        issue(&w, "a1", "alice").await;
        w.transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();

        // The owner sells through the marketplace while the two-signature
        // transfer is still open.
        w.assets
            .list_for_sale(&Caller::user("alice"), "a1", 100)
            .await
            .unwrap();
        w.assets.buy(&Caller::user("bob"), "a1", "bob").await.unwrap();

        let err = w.transfers.approve(&Caller::user("bob"), "a1").await.unwrap_err();
        assert!(matches!(err, LedgerError::Invalidated { .. }));
        assert_eq!(
            w.transfers.pending_transfer("a1").unwrap().status,
            TransferStatus::Invalid
        );
        // Ownership stays with the marketplace outcome.
        assert_eq!(w.assets.read("a1").unwrap().owner, "bob");
    }

    #[tokio::test]
    async fn test_deleted_asset_invalidates_pending_transfer() {
        let w = world().await;
        issue(&w, "a1", "alice").await;
        w.transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();

        w.assets.delete("a1").await.unwrap();

        let err = w.transfers.approve(&Caller::user("bob"), "a1").await.unwrap_err();
        assert!(matches!(err, LedgerError::Invalidated { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_serialize_without_lost_updates() {
        let w = world().await;
        issue(&w, "a1", "alice").await;
        let assets = Arc::new(w.assets);

        let mut handles = Vec::new();
        for i in 0..10 {
            let assets = assets.clone();
            handles.push(tokio::spawn(async move {
                assets
                    .grant_access(&Caller::user("alice"), "a1", &format!("viewer-{i}"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let asset = assets.read("a1").unwrap();
        assert_eq!(asset.viewers.len(), 10);
        // Ten commits on top of creation, none lost.
        assert_eq!(asset.sequence, 11);
    }

    #[tokio::test]
    async fn test_suspended_user_still_resolvable_everywhere() {
        let w = world().await;
        issue(&w, "a1", "alice").await;
        w.users
            .set_status(&Caller::admin("root"), "bob", "Suspended")
            .await
            .unwrap();

        // Status is advisory to outer layers; the ledger still resolves the
        // user for transfers.
        let opened = w
            .transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();
        assert_eq!(opened.new_owner, "bob");
        assert_eq!(w.users.read("bob").unwrap().status, "Suspended");
    }

    #[tokio::test]
    async fn test_unknown_ids_surface_typed_not_found() {
        let w = world().await;

        assert_eq!(
            w.assets.read("ghost").unwrap_err(),
            LedgerError::not_found(EntityKind::Asset, "ghost")
        );
        assert_eq!(
            w.users.read("ghost").unwrap_err(),
            LedgerError::not_found(EntityKind::User, "ghost")
        );
        assert_eq!(
            w.transfers.pending_transfer("ghost").unwrap_err(),
            LedgerError::not_found(EntityKind::Transfer, "ghost")
        );
        assert_eq!(w.bus.events_published(), 2);
    }
}
