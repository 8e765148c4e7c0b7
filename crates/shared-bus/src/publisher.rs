//! # Event Publisher
//!
//! The publishing side of the change-notification bus. Emission is
//! fire-and-forget from the core's perspective; delivery guarantees belong
//! to the transport behind [`EventPublisher`].

use crate::events::{ChangeNotification, Delivery, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing change notifications to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a notification.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received it.
    async fn publish(&self, notification: ChangeNotification) -> usize;

    /// Get the total number of notifications published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the notification bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-node operation; distributed deployments
/// would put a durable, per-subscriber-acknowledged log behind the same
/// traits.
pub struct InMemoryEventBus {
    /// Broadcast sender for deliveries.
    sender: broadcast::Sender<Delivery>,

    /// Monotonic delivery ordinal, assigned at publish.
    next_ordinal: AtomicU64,

    /// Total notifications published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_ordinal: AtomicU64::new(1),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to notifications matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(receiver, filter)
    }

    /// Get a stream of deliveries matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, notification: ChangeNotification) -> usize {
        let name = notification.event.name();
        let entity = notification.event.entity_id().to_string();
        let ordinal = self.next_ordinal.fetch_add(1, Ordering::Relaxed);

        // Always increment counter (emission was attempted).
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(Delivery { ordinal, notification }) {
            Ok(receiver_count) => {
                debug!(
                    event = name,
                    entity = %entity,
                    ordinal,
                    receivers = receiver_count,
                    "Notification published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - the notification is dropped.
                warn!(
                    event = name,
                    entity = %entity,
                    error = %e,
                    "Notification dropped (no receivers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
