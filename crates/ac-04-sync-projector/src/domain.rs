//! Row types for the off-chain index replica.
//!
//! Rows mirror the ledger entities plus the `sequence` column the
//! projector compares against before overwriting. History rows are
//! append-only and keep the full JSON snapshot each notification carried.

use serde::{Deserialize, Serialize};
use shared_bus::LedgerEvent;
use shared_types::entities::{Asset, Timestamp, User};
use uuid::Uuid;

/// Indexed copy of an [`Asset`], current as of `sequence`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub owner: String,
    pub status: String,
    pub price: u64,
    pub updated_at: Timestamp,
    pub last_modified_by: String,
    pub sequence: u64,
}

impl From<&Asset> for AssetRow {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            category: asset.category.clone(),
            owner: asset.owner.clone(),
            status: format!("{:?}", asset.status),
            price: asset.price,
            updated_at: asset.updated_at,
            last_modified_by: asset.last_modified_by.clone(),
            sequence: asset.sequence,
        }
    }
}

/// Indexed copy of a [`User`], current as of `sequence`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub role: String,
    pub status: String,
    pub balance: u64,
    pub updated_at: Timestamp,
    pub sequence: u64,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            role: format!("{:?}", user.role),
            status: user.status.clone(),
            balance: user.balance,
            updated_at: user.updated_at,
            sequence: user.sequence,
        }
    }
}

/// What a notification did, as recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Created,
    Updated,
    Transferred,
    Listed,
    Delisted,
    Locked,
    Unlocked,
    GrantAccess,
    RevokeAccess,
    Delete,
    StatusUpdated,
    CreditsMinted,
    TransferInitiated,
    TransferApproved,
    TransferExecuted,
    TransferRejected,
    TransferExpired,
}

impl ActionType {
    /// The audit action a given event maps to.
    pub fn of(event: &LedgerEvent) -> Self {
        match event {
            LedgerEvent::AssetCreated(_) | LedgerEvent::UserCreated(_) => Self::Created,
            LedgerEvent::AssetUpdated(_) | LedgerEvent::UserUpdated(_) => Self::Updated,
            LedgerEvent::AssetTransferred(_) => Self::Transferred,
            LedgerEvent::AssetListed(_) => Self::Listed,
            LedgerEvent::AssetDelisted(_) => Self::Delisted,
            LedgerEvent::AssetLocked(_) => Self::Locked,
            LedgerEvent::AssetUnlocked(_) => Self::Unlocked,
            LedgerEvent::AccessGranted(_) => Self::GrantAccess,
            LedgerEvent::AccessRevoked(_) => Self::RevokeAccess,
            LedgerEvent::AssetDeleted { .. } => Self::Delete,
            LedgerEvent::UserStatusUpdated(_) => Self::StatusUpdated,
            LedgerEvent::CreditsMinted(_) => Self::CreditsMinted,
            LedgerEvent::TransferInitiated(_) => Self::TransferInitiated,
            LedgerEvent::TransferApproved(_) => Self::TransferApproved,
            LedgerEvent::TransferExecuted(_) => Self::TransferExecuted,
            LedgerEvent::TransferRejected(_) => Self::TransferRejected,
            LedgerEvent::TransferExpired(_) => Self::TransferExpired,
        }
    }
}

/// One append-only audit trail entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub tx_id: Uuid,
    pub entity_id: String,
    pub action: ActionType,
    pub from_owner: Option<String>,
    pub to_owner: Option<String>,
    /// Bus-assigned delivery ordinal; with `entity_id` it dedupes replays.
    pub ordinal: u64,
    pub timestamp: Timestamp,
    pub actor_id: Option<String>,
    pub snapshot: serde_json::Value,
}
