//! # Transfer Coordinator Service
//!
//! Two-signature ownership transfers. `initiate` opens a record carrying
//! the owner's signature; `approve` by the recipient completes the pair
//! and reassigns ownership in the same commit that removes the live
//! record. Rejected, expired, and invalidated records stay in the store
//! for inspection.

use crate::repository::TransferRepository;
use ac_01_user_registry::UserRepository;
use ac_02_asset_registry::AssetRepository;
use shared_bus::{ChangeNotification, EventPublisher, LedgerEvent};
use shared_types::caller::CallerContext;
use shared_types::entities::{Approval, ApprovalRole, Asset, PendingTransfer, TransferStatus};
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::storage::{SharedStore, StateStore};
use shared_types::time::TimeSource;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Signatures required before ownership moves.
const REQUIRED_APPROVALS: usize = 2;

pub struct TransferCoordinator<S: StateStore, T: TimeSource> {
    store: SharedStore<S>,
    bus: Arc<dyn EventPublisher>,
    clock: T,
}

/// What `approve` decided while the store lock was held; the notification
/// is published only after the lock drops.
enum ApprovalOutcome {
    /// Signature recorded, second one still outstanding.
    Recorded(PendingTransfer),
    /// Both signatures collected and ownership reassigned.
    Executed {
        transfer: PendingTransfer,
        asset: Asset,
    },
    /// The approval window had elapsed; the record was marked Expired.
    Expired(PendingTransfer),
}

impl<S: StateStore, T: TimeSource> TransferCoordinator<S, T> {
    pub fn new(store: SharedStore<S>, bus: Arc<dyn EventPublisher>, clock: T) -> Self {
        Self { store, bus, clock }
    }

    /// Open a transfer of `asset_id` to `new_owner`, signed by the owner.
    ///
    /// A terminal record left behind by a rejected, expired, or invalidated
    /// attempt is overwritten; a live Pending record blocks a second one.
    pub async fn initiate(
        &self,
        ctx: &dyn CallerContext,
        asset_id: &str,
        new_owner: &str,
    ) -> Result<PendingTransfer, LedgerError> {
        let transfer = {
            let mut store = self.store.write();
            let asset = AssetRepository::load(&*store, asset_id)?;

            if asset.owner != ctx.principal() {
                return Err(LedgerError::not_authorized(format!(
                    "only the asset owner can initiate a transfer. Owner: {}, Signer: {}",
                    asset.owner,
                    ctx.principal()
                )));
            }
            if new_owner == ctx.principal() {
                return Err(LedgerError::validation("cannot transfer asset to yourself"));
            }
            if !UserRepository::exists(&*store, new_owner)? {
                return Err(LedgerError::not_found(EntityKind::User, new_owner));
            }

            let prior = TransferRepository::try_load(&*store, asset_id)?;
            if prior.as_ref().is_some_and(|p| p.status == TransferStatus::Pending) {
                return Err(LedgerError::invalid_state(
                    "a pending transfer already exists for this asset",
                ));
            }

            let transfer = PendingTransfer::initiate(&asset, new_owner, self.clock.now());
            let op = if prior.is_some() {
                TransferRepository::put_op(&transfer)?
            } else {
                TransferRepository::insert_op(&transfer)?
            };
            store.atomic_commit(vec![op])?;
            transfer
        };

        info!(asset = asset_id, new_owner, "Transfer initiated");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::TransferInitiated(transfer.clone())))
            .await;
        Ok(transfer)
    }

    /// Add the recipient's signature; with both collected, reassign
    /// ownership and remove the live record in one commit.
    ///
    /// An elapsed approval window is detected here, before any other check:
    /// the record is marked Expired, `TransferExpired` is emitted, and the
    /// call fails.
    pub async fn approve(
        &self,
        ctx: &dyn CallerContext,
        asset_id: &str,
    ) -> Result<PendingTransfer, LedgerError> {
        let outcome = {
            let mut store = self.store.write();
            let mut transfer = TransferRepository::load(&*store, asset_id)?;
            let now = self.clock.now();

            if transfer.is_expired(now) {
                transfer.status = TransferStatus::Expired;
                store.atomic_commit(vec![TransferRepository::put_op(&transfer)?])?;
                ApprovalOutcome::Expired(transfer)
            } else {
                if transfer.status != TransferStatus::Pending {
                    return Err(LedgerError::invalid_state(format!(
                        "transfer is no longer pending. Status: {:?}",
                        transfer.status
                    )));
                }
                if ctx.principal() != transfer.new_owner {
                    return Err(LedgerError::not_authorized(format!(
                        "only the recipient can approve. Expected: {}, Got: {}",
                        transfer.new_owner,
                        ctx.principal()
                    )));
                }
                if transfer.has_signed(ctx.principal()) {
                    return Err(LedgerError::invalid_state(
                        "you have already approved this transfer",
                    ));
                }

                transfer.approvals.push(Approval {
                    signer: ctx.principal().to_string(),
                    role: ApprovalRole::NewOwner,
                    timestamp: now,
                    comment: Some("Approved transfer".to_string()),
                });

                if transfer.approvals.len() < REQUIRED_APPROVALS {
                    store.atomic_commit(vec![TransferRepository::put_op(&transfer)?])?;
                    ApprovalOutcome::Recorded(transfer)
                } else {
                    // Re-read the asset under this same lock: any ownership
                    // change since initiation invalidates the transfer.
                    match AssetRepository::try_load(&*store, asset_id)? {
                        None => {
                            transfer.status = TransferStatus::Invalid;
                            store.atomic_commit(vec![TransferRepository::put_op(&transfer)?])?;
                            return Err(LedgerError::invalidated(format!(
                                "asset no longer exists: {asset_id}"
                            )));
                        }
                        Some(asset) if asset.owner != transfer.current_owner => {
                            transfer.status = TransferStatus::Invalid;
                            store.atomic_commit(vec![TransferRepository::put_op(&transfer)?])?;
                            return Err(LedgerError::invalidated(format!(
                                "asset owner has changed. Expected: {}, Current: {}",
                                transfer.current_owner, asset.owner
                            )));
                        }
                        Some(mut asset) => {
                            asset.owner = transfer.new_owner.clone();
                            asset.touch(ctx.principal(), now);
                            transfer.status = TransferStatus::Executed;
                            transfer.executed_at = Some(now);
                            // Reassignment and record removal land together.
                            store.atomic_commit(vec![
                                AssetRepository::put_op(&asset)?,
                                TransferRepository::delete_op(asset_id),
                            ])?;
                            ApprovalOutcome::Executed { transfer, asset }
                        }
                    }
                }
            }
        };

        match outcome {
            ApprovalOutcome::Expired(transfer) => {
                warn!(asset = asset_id, "Transfer approval window elapsed");
                self.bus
                    .publish(ChangeNotification::new(LedgerEvent::TransferExpired(transfer)))
                    .await;
                Err(LedgerError::Expired { asset_id: asset_id.to_string() })
            }
            ApprovalOutcome::Recorded(transfer) => {
                info!(asset = asset_id, signer = ctx.principal(), "Transfer approved");
                self.bus
                    .publish(ChangeNotification::new(LedgerEvent::TransferApproved(
                        transfer.clone(),
                    )))
                    .await;
                Ok(transfer)
            }
            ApprovalOutcome::Executed { transfer, asset } => {
                info!(
                    asset = asset_id,
                    new_owner = transfer.new_owner,
                    "Transfer executed"
                );
                let tx = Uuid::new_v4();
                self.bus
                    .publish(ChangeNotification::with_tx(
                        tx,
                        LedgerEvent::AssetTransferred(asset),
                    ))
                    .await;
                self.bus
                    .publish(ChangeNotification::with_tx(
                        tx,
                        LedgerEvent::TransferExecuted(transfer.clone()),
                    ))
                    .await;
                Ok(transfer)
            }
        }
    }

    /// Decline a pending transfer. Either involved party may reject; the
    /// record is retained with the reason.
    pub async fn reject(
        &self,
        ctx: &dyn CallerContext,
        asset_id: &str,
        reason: &str,
    ) -> Result<PendingTransfer, LedgerError> {
        let transfer = {
            let mut store = self.store.write();
            let mut transfer = TransferRepository::load(&*store, asset_id)?;

            if transfer.status != TransferStatus::Pending {
                return Err(LedgerError::invalid_state(format!(
                    "transfer is no longer pending. Status: {:?}",
                    transfer.status
                )));
            }
            let caller = ctx.principal();
            if caller != transfer.current_owner && caller != transfer.new_owner {
                return Err(LedgerError::not_authorized(format!(
                    "only involved parties can reject. Rejector: {caller}"
                )));
            }

            transfer.status = TransferStatus::Rejected;
            transfer.rejection_reason = Some(reason.to_string());
            store.atomic_commit(vec![TransferRepository::put_op(&transfer)?])?;
            transfer
        };

        info!(asset = asset_id, rejector = ctx.principal(), "Transfer rejected");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::TransferRejected(transfer.clone())))
            .await;
        Ok(transfer)
    }

    /// The transfer record for an asset, whatever its status.
    pub fn pending_transfer(&self, asset_id: &str) -> Result<PendingTransfer, LedgerError> {
        TransferRepository::load(&*self.store.read(), asset_id)
    }

    /// All transfers still awaiting their second signature.
    pub fn all_pending_transfers(&self) -> Result<Vec<PendingTransfer>, LedgerError> {
        Ok(TransferRepository::all(&*self.store.read())?
            .into_iter()
            .filter(|t| t.status == TransferStatus::Pending)
            .collect())
    }
}
