//! # Sync Projector Service
//!
//! Applies one bus delivery to the index replica. The transport is
//! at-least-once and may reorder across reconnects, so every apply is
//! idempotent: snapshot upserts are gated on a strictly greater sequence,
//! history appends deduplicate on the delivery ordinal, and tombstones
//! are unconditional.

use crate::domain::{ActionType, AssetRow, HistoryRow, UserRow};
use crate::ports::{IndexError, IndexStore, UpsertOutcome};
use shared_bus::{Delivery, LedgerEvent, NotificationKind};
use shared_types::entities::{Asset, PendingTransfer, User};
use shared_types::time::TimeSource;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Projector<T: TimeSource> {
    index: Arc<dyn IndexStore>,
    clock: T,
}

enum Payload<'a> {
    Asset(&'a Asset),
    User(&'a User),
    Tombstone(&'a str),
    Transfer(&'a PendingTransfer),
}

fn payload(event: &LedgerEvent) -> Payload<'_> {
    match event {
        LedgerEvent::AssetCreated(a)
        | LedgerEvent::AssetUpdated(a)
        | LedgerEvent::AssetTransferred(a)
        | LedgerEvent::AssetListed(a)
        | LedgerEvent::AssetDelisted(a)
        | LedgerEvent::AssetLocked(a)
        | LedgerEvent::AssetUnlocked(a)
        | LedgerEvent::AccessGranted(a)
        | LedgerEvent::AccessRevoked(a) => Payload::Asset(a),
        LedgerEvent::AssetDeleted { asset_id } => Payload::Tombstone(asset_id),
        LedgerEvent::UserCreated(u)
        | LedgerEvent::UserUpdated(u)
        | LedgerEvent::UserStatusUpdated(u)
        | LedgerEvent::CreditsMinted(u) => Payload::User(u),
        LedgerEvent::TransferInitiated(t)
        | LedgerEvent::TransferApproved(t)
        | LedgerEvent::TransferExecuted(t)
        | LedgerEvent::TransferRejected(t)
        | LedgerEvent::TransferExpired(t) => Payload::Transfer(t),
    }
}

impl<T: TimeSource> Projector<T> {
    pub fn new(index: Arc<dyn IndexStore>, clock: T) -> Self {
        Self { index, clock }
    }

    pub fn index(&self) -> &Arc<dyn IndexStore> {
        &self.index
    }

    /// Apply one delivery. `Ok` means the delivery may be acknowledged,
    /// including the benign skip paths; `Err` means the index was
    /// unreachable and the delivery must be retried.
    pub async fn apply(&self, delivery: &Delivery) -> Result<(), IndexError> {
        let notification = &delivery.notification;
        let action = ActionType::of(&notification.event);

        match notification.event.kind() {
            NotificationKind::EntityMutation => match payload(&notification.event) {
                Payload::Asset(asset) => self.apply_asset(delivery, asset, action).await,
                Payload::User(user) => self.apply_user(delivery, user, action).await,
                // kind() and payload() agree by construction.
                _ => Ok(()),
            },
            NotificationKind::EntityTombstone => {
                let Payload::Tombstone(asset_id) = payload(&notification.event) else {
                    return Ok(());
                };
                self.index.delete_asset(asset_id).await?;
                debug!(asset = asset_id, ordinal = delivery.ordinal, "Asset row removed");
                self.index
                    .append_history(HistoryRow {
                        tx_id: notification.tx_id,
                        entity_id: asset_id.to_string(),
                        action,
                        from_owner: None,
                        to_owner: None,
                        ordinal: delivery.ordinal,
                        timestamp: self.clock.now(),
                        actor_id: None,
                        snapshot: serde_json::Value::Null,
                    })
                    .await
            }
            NotificationKind::TransferEvent => {
                let Payload::Transfer(transfer) = payload(&notification.event) else {
                    return Ok(());
                };
                self.apply_transfer(delivery, transfer, action).await
            }
        }
    }

    async fn apply_asset(
        &self,
        delivery: &Delivery,
        asset: &Asset,
        action: ActionType,
    ) -> Result<(), IndexError> {
        let snapshot = match serde_json::to_value(asset) {
            Ok(v) => v,
            Err(e) => {
                warn!(asset = asset.id, error = %e, "Undecodable snapshot, skipping");
                return Ok(());
            }
        };

        match self.index.upsert_asset(AssetRow::from(asset)).await? {
            UpsertOutcome::Stale { stored_sequence } => {
                warn!(
                    asset = asset.id,
                    incoming = asset.sequence,
                    stored = stored_sequence,
                    "Stale asset snapshot dropped"
                );
                Ok(())
            }
            UpsertOutcome::Applied { replaced } => {
                self.index
                    .append_history(HistoryRow {
                        tx_id: delivery.notification.tx_id,
                        entity_id: asset.id.clone(),
                        action,
                        from_owner: replaced.map(|r| r.owner),
                        to_owner: Some(asset.owner.clone()),
                        ordinal: delivery.ordinal,
                        timestamp: asset.updated_at,
                        actor_id: Some(asset.last_modified_by.clone()),
                        snapshot,
                    })
                    .await
            }
        }
    }

    async fn apply_user(
        &self,
        delivery: &Delivery,
        user: &User,
        action: ActionType,
    ) -> Result<(), IndexError> {
        let snapshot = match serde_json::to_value(user) {
            Ok(v) => v,
            Err(e) => {
                warn!(user = user.id, error = %e, "Undecodable snapshot, skipping");
                return Ok(());
            }
        };

        match self.index.upsert_user(UserRow::from(user)).await? {
            UpsertOutcome::Stale { stored_sequence } => {
                warn!(
                    user = user.id,
                    incoming = user.sequence,
                    stored = stored_sequence,
                    "Stale user snapshot dropped"
                );
                Ok(())
            }
            UpsertOutcome::Applied { .. } => {
                self.index
                    .append_history(HistoryRow {
                        tx_id: delivery.notification.tx_id,
                        entity_id: user.id.clone(),
                        action,
                        from_owner: None,
                        to_owner: None,
                        ordinal: delivery.ordinal,
                        timestamp: user.updated_at,
                        actor_id: None,
                        snapshot,
                    })
                    .await
            }
        }
    }

    /// Transfer lifecycle events feed the audit trail only; the live
    /// record is read from the authoritative store.
    async fn apply_transfer(
        &self,
        delivery: &Delivery,
        transfer: &PendingTransfer,
        action: ActionType,
    ) -> Result<(), IndexError> {
        let snapshot = match serde_json::to_value(transfer) {
            Ok(v) => v,
            Err(e) => {
                warn!(asset = transfer.asset_id, error = %e, "Undecodable snapshot, skipping");
                return Ok(());
            }
        };

        let last_approval = transfer.approvals.last();
        self.index
            .append_history(HistoryRow {
                tx_id: delivery.notification.tx_id,
                entity_id: transfer.asset_id.clone(),
                action,
                from_owner: Some(transfer.current_owner.clone()),
                to_owner: Some(transfer.new_owner.clone()),
                ordinal: delivery.ordinal,
                timestamp: transfer
                    .executed_at
                    .or(last_approval.map(|a| a.timestamp))
                    .unwrap_or(transfer.created_at),
                actor_id: last_approval.map(|a| a.signer.clone()),
                snapshot,
            })
            .await
    }
}
