//! # Shared Bus - Change Notification Fan-Out
//!
//! Every successful registry/coordinator mutation emits one typed
//! [`ChangeNotification`] through this bus; the sync projector (and any
//! other consumer) subscribes with a topic filter.
//!
//! ```text
//! ┌──────────────┐                    ┌────────────────┐
//! │  Registries  │    publish()       │ Sync Projector │
//! │ Coordinator  │ ──────┐            │                │
//! └──────────────┘       │            └────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery semantics
//!
//! The transport owes consumers at-least-once delivery; it does not owe
//! them exactly-once or global ordering across reconnects. Consumers
//! therefore key their writes on per-entity sequences, and acknowledge by
//! the bus-assigned delivery ordinal only after their own commit succeeds.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{
    ChangeNotification, Delivery, EventFilter, EventTopic, LedgerEvent, NotificationKind,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum deliveries to buffer per subscriber before lag kicks in.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
