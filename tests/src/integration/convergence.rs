//! # Projector Convergence
//!
//! The sync projector consuming the live feed produced by real registry
//! mutations, both driven by hand and through the long-lived runner.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ac_01_user_registry::UserRegistry;
    use ac_02_asset_registry::AssetRegistry;
    use ac_03_transfer_coordinator::TransferCoordinator;
    use ac_04_sync_projector::{ActionType, IndexStore, MemoryIndexStore, Projector, ProjectorRunner};
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use shared_types::caller::Caller;
    use shared_types::entities::{AssetStatus, UserRole};
    use shared_types::storage::{shared_store, MemoryStateStore};
    use shared_types::time::ManualClock;
    use tokio::sync::watch;
    use tokio::time::timeout;

    struct World {
        bus: Arc<InMemoryEventBus>,
        clock: ManualClock,
        users: UserRegistry<MemoryStateStore, ManualClock>,
        assets: AssetRegistry<MemoryStateStore, ManualClock>,
        transfers: TransferCoordinator<MemoryStateStore, ManualClock>,
    }

    fn world() -> World {
        crate::init_tracing();
        let store = shared_store(MemoryStateStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = ManualClock::at(1_000);

        let users = UserRegistry::new(store.clone(), bus.clone(), clock.clone());
        let assets = AssetRegistry::new(store.clone(), bus.clone(), clock.clone());
        let transfers = TransferCoordinator::new(store, bus.clone(), clock.clone());
        World { bus, clock, users, assets, transfers }
    }

    /// Run the full marketplace scenario against the registries.
    async fn run_scenario(w: &World) {
        w.users.create("alice", "Alice A.", UserRole::User).await.unwrap();
        w.users.create("bob", "Bob B.", UserRole::User).await.unwrap();
        w.users
            .mint_credits(&Caller::admin("root"), "bob", 500)
            .await
            .unwrap();
        w.assets
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
        w.assets
            .list_for_sale(&Caller::user("alice"), "a1", 200)
            .await
            .unwrap();
        w.assets.buy(&Caller::user("bob"), "a1", "bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_replica_converges_on_marketplace_flow() {
        let w = world();
        // Subscribe before any mutation so nothing is missed.
        let mut sub = w.bus.subscribe(EventFilter::all());
        let index = Arc::new(MemoryIndexStore::new());
        let projector = Projector::new(
            index.clone() as Arc<dyn IndexStore>,
            w.clock.clone(),
        );

        run_scenario(&w).await;

        // Drain everything the scenario produced.
        while let Ok(Some(delivery)) = sub.try_recv() {
            projector.apply(&delivery).await.unwrap();
        }

        let asset = index.asset("a1").await.unwrap().unwrap();
        assert_eq!(asset.owner, "bob");
        assert_eq!(asset.status, "Owned");
        assert_eq!(asset.price, 0);
        assert_eq!(index.user("bob").await.unwrap().unwrap().balance, 300);
        assert_eq!(index.user("alice").await.unwrap().unwrap().balance, 200);

        // Issue, listing, and sale each left an audit entry.
        let history = index.history_for("a1").await.unwrap();
        let actions: Vec<ActionType> = history.iter().map(|h| h.action).collect();
        assert_eq!(
            actions,
            vec![ActionType::Created, ActionType::Listed, ActionType::Transferred]
        );
        // The sale's three rows share the commit's transaction id.
        let sale_tx = history.last().unwrap().tx_id;
        let bob_history = index.history_for("bob").await.unwrap();
        assert_eq!(bob_history.last().unwrap().tx_id, sale_tx);
    }

    #[tokio::test]
    async fn test_transfer_lifecycle_lands_in_history_only() {
        let w = world();
        let mut sub = w.bus.subscribe(EventFilter::all());
        let index = Arc::new(MemoryIndexStore::new());
        let projector = Projector::new(
            index.clone() as Arc<dyn IndexStore>,
            w.clock.clone(),
        );

        w.users.create("alice", "Alice A.", UserRole::User).await.unwrap();
        w.users.create("bob", "Bob B.", UserRole::User).await.unwrap();
        w.assets
            .create(
                &Caller::user("alice"),
                "a1",
                "Lathe",
                "equipment",
                "alice",
                AssetStatus::Available,
                "",
                "",
            )
            .await
            .unwrap();
        w.transfers
            .initiate(&Caller::user("alice"), "a1", "bob")
            .await
            .unwrap();
        w.transfers.approve(&Caller::user("bob"), "a1").await.unwrap();

        while let Ok(Some(delivery)) = sub.try_recv() {
            projector.apply(&delivery).await.unwrap();
        }

        let asset = index.asset("a1").await.unwrap().unwrap();
        assert_eq!(asset.owner, "bob");

        let actions: Vec<ActionType> = index
            .history_for("a1")
            .await
            .unwrap()
            .iter()
            .map(|h| h.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                ActionType::Created,
                ActionType::TransferInitiated,
                ActionType::Transferred,
                ActionType::TransferExecuted,
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runner_consumes_live_feed_and_shuts_down() {
        let w = world();
        let sub = w.bus.subscribe(EventFilter::all());
        let index = Arc::new(MemoryIndexStore::new());
        let projector = Projector::new(
            index.clone() as Arc<dyn IndexStore>,
            w.clock.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = tokio::spawn(ProjectorRunner::new(sub, projector, shutdown_rx).run());

        run_scenario(&w).await;

        // Wait until the replica reflects the sale.
        timeout(Duration::from_secs(5), async {
            loop {
                if let Some(row) = index.asset("a1").await.unwrap() {
                    if row.owner == "bob" {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("replica did not converge");

        shutdown_tx.send(true).unwrap();
        let finished = runner.await.unwrap();

        // Eight notifications, ordinals 1..=8, all acknowledged.
        assert_eq!(w.bus.events_published(), 8);
        assert_eq!(finished.last_acked(), Some(8));
    }
}
