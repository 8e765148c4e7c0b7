//! Marketplace operations: listing, delisting, and purchase with the
//! internal credit balance.
//!
//! A purchase moves three records in one commit: buyer balance, seller
//! balance, and the asset itself. The three notifications it emits share
//! one transaction id.

use super::AssetRegistry;
use crate::repository::AssetRepository;
use ac_01_user_registry::UserRepository;
use shared_bus::{ChangeNotification, LedgerEvent};
use shared_types::caller::CallerContext;
use shared_types::entities::{Asset, AssetStatus};
use shared_types::errors::LedgerError;
use shared_types::storage::StateStore;
use shared_types::time::TimeSource;
use tracing::info;
use uuid::Uuid;

/// Currency code stamped on marketplace listings.
pub const DEFAULT_CURRENCY: &str = "USD";

impl<S: StateStore, T: TimeSource> AssetRegistry<S, T> {
    /// List an asset for sale at `price` credits.
    pub async fn list_for_sale(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        price: u64,
    ) -> Result<Asset, LedgerError> {
        if price == 0 {
            return Err(LedgerError::validation("price must be greater than 0"));
        }

        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;

            if asset.is_locked() {
                return Err(LedgerError::invalid_state("asset is locked and cannot be listed"));
            }
            self.require_owner(&asset, ctx, "list")?;

            asset.status = AssetStatus::ForSale;
            asset.price = price;
            asset.currency = DEFAULT_CURRENCY.to_string();
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, price, "Asset listed for sale");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetListed(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Take an asset off the market.
    pub async fn delist(&self, ctx: &dyn CallerContext, id: &str) -> Result<Asset, LedgerError> {
        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;

            if !asset.is_for_sale() {
                return Err(LedgerError::invalid_state("asset is not for sale"));
            }
            self.require_owner(&asset, ctx, "delist")?;

            asset.status = AssetStatus::Available;
            asset.price = 0;
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, "Asset delisted");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AssetDelisted(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Purchase a listed asset.
    ///
    /// Atomically: buyer balance -= price, seller balance += price, owner =
    /// buyer, status = Owned, price = 0. All three writes commit together
    /// or not at all; notifications go out only after the commit.
    pub async fn buy(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        buyer_id: &str,
    ) -> Result<Asset, LedgerError> {
        let (asset, buyer, seller) = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;

            if !asset.is_for_sale() {
                return Err(LedgerError::invalid_state(format!("asset {id} is not for sale")));
            }

            let mut buyer = UserRepository::load(&*store, buyer_id)?;
            if buyer.id != ctx.principal() {
                return Err(LedgerError::not_authorized(format!(
                    "you can only buy assets for yourself. Buyer: {}, Signer: {}",
                    buyer.id,
                    ctx.principal()
                )));
            }

            let mut seller = UserRepository::load(&*store, &asset.owner)?;
            if buyer.id == seller.id {
                return Err(LedgerError::validation("cannot buy your own asset"));
            }
            if buyer.balance < asset.price {
                return Err(LedgerError::validation(format!(
                    "insufficient balance. Required: {}, Available: {}",
                    asset.price, buyer.balance
                )));
            }

            let now = self.clock.now();
            buyer.balance -= asset.price;
            seller.balance = seller
                .balance
                .checked_add(asset.price)
                .ok_or_else(|| LedgerError::validation("seller balance overflow"))?;
            buyer.touch(now);
            seller.touch(now);

            asset.owner = buyer.id.clone();
            asset.status = AssetStatus::Owned;
            asset.price = 0;
            asset.touch(&buyer.id, now);

            store.atomic_commit(vec![
                UserRepository::put_op(&buyer)?,
                UserRepository::put_op(&seller)?,
                AssetRepository::put_op(&asset)?,
            ])?;
            (asset, buyer, seller)
        };

        info!(asset = id, buyer = %buyer.id, seller = %seller.id, "Asset purchased");
        let tx_id = Uuid::new_v4();
        self.bus
            .publish(ChangeNotification::with_tx(tx_id, LedgerEvent::UserUpdated(buyer)))
            .await;
        self.bus
            .publish(ChangeNotification::with_tx(tx_id, LedgerEvent::UserUpdated(seller)))
            .await;
        self.bus
            .publish(ChangeNotification::with_tx(
                tx_id,
                LedgerEvent::AssetTransferred(asset.clone()),
            ))
            .await;
        Ok(asset)
    }
}
