//! # Asset Registry Service
//!
//! Asset lifecycle against the authoritative store. Every operation runs as
//! one atomic commit while holding the store's write lock, and emits its
//! notification only after the commit succeeds, so no caller ever observes
//! partially-applied state.

mod access;
mod marketplace;

pub use marketplace::DEFAULT_CURRENCY;

use crate::repository::AssetRepository;
use ac_01_user_registry::UserRepository;
use shared_bus::{ChangeNotification, EventPublisher, LedgerEvent};
use shared_types::caller::CallerContext;
use shared_types::entities::{Asset, AssetStatus};
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::storage::{SharedStore, StateStore, StateStoreError};
use shared_types::time::TimeSource;
use std::sync::Arc;
use tracing::info;

pub struct AssetRegistry<S: StateStore, T: TimeSource> {
    store: SharedStore<S>,
    bus: Arc<dyn EventPublisher>,
    clock: T,
}

impl<S: StateStore, T: TimeSource> AssetRegistry<S, T> {
    pub fn new(store: SharedStore<S>, bus: Arc<dyn EventPublisher>, clock: T) -> Self {
        Self { store, bus, clock }
    }

    /// Issue a new asset. Only its declared owner may create it, and the
    /// owner must be a registered user.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        name: &str,
        category: &str,
        owner: &str,
        status: AssetStatus,
        metadata_ref: &str,
        metadata_hash: &str,
    ) -> Result<Asset, LedgerError> {
        if owner != ctx.principal() {
            return Err(LedgerError::not_authorized(format!(
                "assets can only be created by their owner. Owner: {owner}, Signer: {}",
                ctx.principal()
            )));
        }

        let asset = {
            let mut store = self.store.write();
            if !UserRepository::exists(&*store, owner)? {
                return Err(LedgerError::not_found(EntityKind::User, owner));
            }

            let now = self.clock.now();
            let asset = Asset {
                id: id.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                owner: owner.to_string(),
                status,
                metadata_ref: metadata_ref.to_string(),
                metadata_hash: metadata_hash.to_string(),
                // Default: private to the owner.
                viewers: vec![],
                price: 0,
                currency: String::new(),
                updated_at: now,
                last_modified_by: owner.to_string(),
                sequence: 1,
            };
            store
                .atomic_commit(vec![AssetRepository::insert_op(&asset)?])
                .map_err(|e| match e {
                    StateStoreError::KeyExists { .. } => {
                        LedgerError::already_exists(EntityKind::Asset, id)
                    }
                    other => other.into(),
                })?;
            asset
        };

        info!(asset = id, owner, "Asset created");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetCreated(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Read an asset by id.
    pub fn read(&self, id: &str) -> Result<Asset, LedgerError> {
        AssetRepository::load(&*self.store.read(), id)
    }

    /// All assets, in key order.
    pub fn assets(&self) -> Result<Vec<Asset>, LedgerError> {
        AssetRepository::all(&*self.store.read())
    }

    /// Update an asset's descriptive fields. Owner, status, price, and the
    /// viewer set move only through their dedicated operations.
    pub async fn update(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        name: &str,
        category: &str,
        metadata_ref: &str,
        metadata_hash: &str,
    ) -> Result<Asset, LedgerError> {
        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;

            if asset.is_locked() {
                return Err(LedgerError::invalid_state("asset is locked and cannot be updated"));
            }
            self.require_owner(&asset, ctx, "update")?;

            asset.name = name.to_string();
            asset.category = category.to_string();
            asset.metadata_ref = metadata_ref.to_string();
            asset.metadata_hash = metadata_hash.to_string();
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetUpdated(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Remove an asset. The tombstone notification carries only the id.
    pub async fn delete(&self, id: &str) -> Result<(), LedgerError> {
        {
            let mut store = self.store.write();
            // Existence check before the blind delete.
            AssetRepository::load(&*store, id)?;
            store.atomic_commit(vec![AssetRepository::delete_op(id)])?;
        }

        info!(asset = id, "Asset deleted");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetDeleted {
                asset_id: id.to_string(),
            }))
            .await;
        Ok(())
    }

    /// Freeze an asset. Admin role only; overrides any other status and
    /// blocks update/list/delist/buy/legacy-transfer until unlocked.
    pub async fn lock(&self, ctx: &dyn CallerContext, id: &str) -> Result<Asset, LedgerError> {
        self.require_admin(ctx, "lock assets")?;

        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;
            asset.status = AssetStatus::Locked;
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, "Asset locked");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetLocked(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Unfreeze an asset back to Available. Admin role only.
    pub async fn unlock(&self, ctx: &dyn CallerContext, id: &str) -> Result<Asset, LedgerError> {
        self.require_admin(ctx, "unlock assets")?;

        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;
            asset.status = AssetStatus::Available;
            asset.price = 0;
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, "Asset unlocked");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetUnlocked(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Single-signature ownership override, bypassing the two-signature
    /// coordinator entirely.
    ///
    /// Deprecated in favor of the coordinator; retained as a documented
    /// escape hatch for backward compatibility and admin-assisted recovery.
    pub async fn legacy_transfer(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        new_owner: &str,
    ) -> Result<Asset, LedgerError> {
        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;

            if asset.is_locked() {
                return Err(LedgerError::invalid_state(
                    "asset is locked and cannot be transferred",
                ));
            }
            self.require_owner(&asset, ctx, "transfer")?;
            if !UserRepository::exists(&*store, new_owner)? {
                return Err(LedgerError::not_found(EntityKind::User, new_owner));
            }

            asset.owner = new_owner.to_string();
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, new_owner, "Asset transferred (legacy single-signature)");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetTransferred(asset.clone())))
            .await;
        Ok(asset)
    }

    fn require_owner(
        &self,
        asset: &Asset,
        ctx: &dyn CallerContext,
        action: &str,
    ) -> Result<(), LedgerError> {
        if asset.owner != ctx.principal() {
            return Err(LedgerError::not_authorized(format!(
                "only the asset owner can {action} it. Owner: {}, Signer: {}",
                asset.owner,
                ctx.principal()
            )));
        }
        Ok(())
    }

    fn require_admin(&self, ctx: &dyn CallerContext, action: &str) -> Result<(), LedgerError> {
        if !ctx.is_admin() {
            return Err(LedgerError::not_authorized(format!(
                "only admin can {action}. Signer: {}",
                ctx.principal()
            )));
        }
        Ok(())
    }
}
