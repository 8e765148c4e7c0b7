//! # Ledger Entities
//!
//! The three entity families recorded in the authoritative store: assets,
//! users, and pending two-signature transfers.
//!
//! ## Type Decisions
//!
//! - `balance`/`price: u64` - credits are discrete; unsigned arithmetic makes
//!   the balance >= 0 invariant structural instead of checked-at-runtime.
//! - `sequence: u64` - per-entity counter, bumped on every committed mutation.
//!   The off-chain projector uses it as a compare-and-swap guard.

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// Viewer sentinel granting public visibility of an asset.
pub const EVERYONE: &str = "EVERYONE";

/// Lifetime of a pending transfer before it can no longer be approved (24h).
pub const TRANSFER_TTL_SECS: i64 = 86_400;

/// Status of an asset in the authoritative store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Not listed, not locked; the default resting state.
    Available,
    /// Acquired through a marketplace purchase.
    Owned,
    /// Frozen by an administrator; mutations and trading are rejected.
    Locked,
    /// Listed on the marketplace at `Asset::price`.
    ForSale,
}

/// Role claim carried by a user record and by the caller context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    User,
    Auditor,
}

/// A discrete asset tracked by the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Immutable identifier, also the store key suffix.
    pub id: String,
    pub name: String,
    /// Free-form category (e.g. "Electronics", "RealEstate").
    pub category: String,
    /// Id of the owning user. Always references a registered user.
    pub owner: String,
    pub status: AssetStatus,
    /// Reference to externally hosted metadata (e.g. an object-store URL).
    pub metadata_ref: String,
    /// Integrity hash of the external metadata.
    pub metadata_hash: String,
    /// Distinct user ids allowed to view, or [`EVERYONE`] for public.
    pub viewers: Vec<String>,
    /// Market price in credits; non-zero only while `ForSale`.
    pub price: u64,
    /// Currency code for the listed price.
    pub currency: String,
    pub updated_at: Timestamp,
    /// Principal whose operation produced the current revision.
    pub last_modified_by: String,
    /// Strictly increasing mutation counter, 1 at creation.
    pub sequence: u64,
}

impl Asset {
    pub fn is_locked(&self) -> bool {
        self.status == AssetStatus::Locked
    }

    pub fn is_for_sale(&self) -> bool {
        self.status == AssetStatus::ForSale
    }

    /// Whether `viewer` currently appears in the viewer set.
    pub fn has_viewer(&self, viewer: &str) -> bool {
        self.viewers.iter().any(|v| v == viewer)
    }

    /// Record a mutation: bump the sequence and stamp actor/time.
    pub fn touch(&mut self, actor: &str, now: Timestamp) {
        self.sequence += 1;
        self.updated_at = now;
        self.last_modified_by = actor.to_string();
    }
}

/// A participant in the network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub role: UserRole,
    /// Free-form status, conventionally "Active" or "Locked".
    pub status: String,
    /// Internal credit balance.
    pub balance: u64,
    pub updated_at: Timestamp,
    /// Strictly increasing mutation counter, 1 at creation.
    pub sequence: u64,
}

impl User {
    /// A freshly registered user: Active, zero balance, sequence 1.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>, role: UserRole, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            role,
            status: "Active".to_string(),
            balance: 0,
            updated_at: now,
            sequence: 1,
        }
    }

    /// Record a mutation: bump the sequence and stamp the time.
    pub fn touch(&mut self, now: Timestamp) {
        self.sequence += 1;
        self.updated_at = now;
    }
}

/// Status of a pending transfer. Every non-`Pending` state is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    Pending,
    /// Both signatures collected and ownership reassigned.
    Executed,
    /// Declined by one of the involved parties.
    Rejected,
    /// The 24h approval window elapsed before the second signature.
    Expired,
    /// The optimistic re-read at execution detected concurrent mutation.
    Invalid,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// Which side of the transfer a signature came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalRole {
    CurrentOwner,
    NewOwner,
}

/// A single signature on a pending transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub signer: String,
    pub role: ApprovalRole,
    pub timestamp: Timestamp,
    pub comment: Option<String>,
}

/// An ownership transfer awaiting its second signature.
///
/// Created by `Initiate` carrying the initiator's own `CurrentOwner`
/// approval, so the common case costs the recipient exactly one `Approve`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTransfer {
    pub asset_id: String,
    /// Asset name snapshotted at initiation, for display/audit.
    pub asset_name: String,
    pub current_owner: String,
    pub new_owner: String,
    pub status: TransferStatus,
    /// Ordered signatures; signers are unique.
    pub approvals: Vec<Approval>,
    pub created_at: Timestamp,
    /// `created_at + TRANSFER_TTL_SECS`.
    pub expires_at: Timestamp,
    pub executed_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
}

impl PendingTransfer {
    /// Open a transfer for `asset`, with the initiator's signature attached.
    pub fn initiate(asset: &Asset, new_owner: impl Into<String>, now: Timestamp) -> Self {
        Self {
            asset_id: asset.id.clone(),
            asset_name: asset.name.clone(),
            current_owner: asset.owner.clone(),
            new_owner: new_owner.into(),
            status: TransferStatus::Pending,
            approvals: vec![Approval {
                signer: asset.owner.clone(),
                role: ApprovalRole::CurrentOwner,
                timestamp: now,
                comment: Some("Initiated transfer".to_string()),
            }],
            created_at: now,
            expires_at: now + TRANSFER_TTL_SECS,
            executed_at: None,
            rejection_reason: None,
        }
    }

    pub fn has_signed(&self, signer: &str) -> bool {
        self.approvals.iter().any(|a| a.signer == signer)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}
