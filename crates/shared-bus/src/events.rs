//! # Change Notifications
//!
//! Every successful mutation in the core emits exactly one typed event
//! carrying the post-mutation snapshot (or, for deletions, just the id).
//! The projector classifies events by [`NotificationKind`]; subscribers
//! filter by [`EventTopic`].

use serde::{Deserialize, Serialize};
use shared_types::entities::{Asset, PendingTransfer, User};
use uuid::Uuid;

/// All events that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // ASSET REGISTRY
    // =========================================================================
    AssetCreated(Asset),
    AssetUpdated(Asset),
    /// Ownership changed: legacy transfer, marketplace buy, or an executed
    /// two-signature transfer.
    AssetTransferred(Asset),
    AssetListed(Asset),
    AssetDelisted(Asset),
    AssetLocked(Asset),
    AssetUnlocked(Asset),
    AccessGranted(Asset),
    AccessRevoked(Asset),
    /// Tombstone: the record is gone, only the id survives.
    AssetDeleted { asset_id: String },

    // =========================================================================
    // USER REGISTRY
    // =========================================================================
    UserCreated(User),
    UserUpdated(User),
    UserStatusUpdated(User),
    CreditsMinted(User),

    // =========================================================================
    // TRANSFER COORDINATOR
    // =========================================================================
    TransferInitiated(PendingTransfer),
    TransferApproved(PendingTransfer),
    TransferExecuted(PendingTransfer),
    TransferRejected(PendingTransfer),
    TransferExpired(PendingTransfer),
}

/// Coarse classification the sync projector switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Upsert of an asset or user snapshot, gated by its sequence.
    EntityMutation,
    /// Unconditional removal; carries no sequence.
    EntityTombstone,
    /// Audit-only transfer lifecycle event.
    TransferEvent,
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::AssetCreated(_)
            | Self::AssetUpdated(_)
            | Self::AssetTransferred(_)
            | Self::AssetListed(_)
            | Self::AssetDelisted(_)
            | Self::AssetLocked(_)
            | Self::AssetUnlocked(_)
            | Self::AccessGranted(_)
            | Self::AccessRevoked(_)
            | Self::AssetDeleted { .. } => EventTopic::AssetRegistry,
            Self::UserCreated(_)
            | Self::UserUpdated(_)
            | Self::UserStatusUpdated(_)
            | Self::CreditsMinted(_) => EventTopic::UserRegistry,
            Self::TransferInitiated(_)
            | Self::TransferApproved(_)
            | Self::TransferExecuted(_)
            | Self::TransferRejected(_)
            | Self::TransferExpired(_) => EventTopic::TransferCoordinator,
        }
    }

    /// How the projector must treat this event.
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::AssetDeleted { .. } => NotificationKind::EntityTombstone,
            Self::TransferInitiated(_)
            | Self::TransferApproved(_)
            | Self::TransferExecuted(_)
            | Self::TransferRejected(_)
            | Self::TransferExpired(_) => NotificationKind::TransferEvent,
            _ => NotificationKind::EntityMutation,
        }
    }

    /// Id of the entity this event is about.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::AssetCreated(a)
            | Self::AssetUpdated(a)
            | Self::AssetTransferred(a)
            | Self::AssetListed(a)
            | Self::AssetDelisted(a)
            | Self::AssetLocked(a)
            | Self::AssetUnlocked(a)
            | Self::AccessGranted(a)
            | Self::AccessRevoked(a) => &a.id,
            Self::AssetDeleted { asset_id } => asset_id,
            Self::UserCreated(u)
            | Self::UserUpdated(u)
            | Self::UserStatusUpdated(u)
            | Self::CreditsMinted(u) => &u.id,
            Self::TransferInitiated(t)
            | Self::TransferApproved(t)
            | Self::TransferExecuted(t)
            | Self::TransferRejected(t)
            | Self::TransferExpired(t) => &t.asset_id,
        }
    }

    /// Per-entity sequence, present only for entity mutations.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        match self {
            Self::AssetCreated(a)
            | Self::AssetUpdated(a)
            | Self::AssetTransferred(a)
            | Self::AssetListed(a)
            | Self::AssetDelisted(a)
            | Self::AssetLocked(a)
            | Self::AssetUnlocked(a)
            | Self::AccessGranted(a)
            | Self::AccessRevoked(a) => Some(a.sequence),
            Self::UserCreated(u)
            | Self::UserUpdated(u)
            | Self::UserStatusUpdated(u)
            | Self::CreditsMinted(u) => Some(u.sequence),
            Self::AssetDeleted { .. }
            | Self::TransferInitiated(_)
            | Self::TransferApproved(_)
            | Self::TransferExecuted(_)
            | Self::TransferRejected(_)
            | Self::TransferExpired(_) => None,
        }
    }

    /// Stable event name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssetCreated(_) => "AssetCreated",
            Self::AssetUpdated(_) => "AssetUpdated",
            Self::AssetTransferred(_) => "AssetTransferred",
            Self::AssetListed(_) => "AssetListed",
            Self::AssetDelisted(_) => "AssetDelisted",
            Self::AssetLocked(_) => "AssetLocked",
            Self::AssetUnlocked(_) => "AssetUnlocked",
            Self::AccessGranted(_) => "AccessGranted",
            Self::AccessRevoked(_) => "AccessRevoked",
            Self::AssetDeleted { .. } => "AssetDeleted",
            Self::UserCreated(_) => "UserCreated",
            Self::UserUpdated(_) => "UserUpdated",
            Self::UserStatusUpdated(_) => "UserStatusUpdated",
            Self::CreditsMinted(_) => "CreditsMinted",
            Self::TransferInitiated(_) => "TransferInitiated",
            Self::TransferApproved(_) => "TransferApproved",
            Self::TransferExecuted(_) => "TransferExecuted",
            Self::TransferRejected(_) => "TransferRejected",
            Self::TransferExpired(_) => "TransferExpired",
        }
    }
}

/// An event wrapped with the transaction id of the commit that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub tx_id: Uuid,
    pub event: LedgerEvent,
}

impl ChangeNotification {
    /// Wrap an event under a fresh transaction id.
    #[must_use]
    pub fn new(event: LedgerEvent) -> Self {
        Self { tx_id: Uuid::new_v4(), event }
    }

    /// Wrap an event under an existing transaction id (for multi-event
    /// commits, e.g. a marketplace buy).
    #[must_use]
    pub fn with_tx(tx_id: Uuid, event: LedgerEvent) -> Self {
        Self { tx_id, event }
    }
}

/// What a subscription yields: the notification plus the bus-assigned
/// delivery ordinal consumers acknowledge by.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub ordinal: u64,
    pub notification: ChangeNotification,
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    AssetRegistry,
    UserRegistry,
    TransferCoordinator,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
