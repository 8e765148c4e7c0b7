//! # Event Subscriber
//!
//! The consumption side of the notification bus. Subscriptions are
//! filtered; lagged receivers skip ahead rather than stall the bus, which
//! is one source of the at-least-once-but-maybe-gappy delivery the
//! projector is built to tolerate.

use crate::events::{Delivery, EventFilter};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving deliveries.
pub struct Subscription {
    receiver: broadcast::Receiver<Delivery>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<Delivery>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next delivery that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(delivery)` - The next matching delivery
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<Delivery> {
        loop {
            let delivery = match self.receiver.recv().await {
                Ok(d) => d,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some deliveries dropped");
                    continue;
                }
            };

            if self.filter.matches(&delivery.notification.event) {
                return Some(delivery);
            }
            // Delivery doesn't match filter, continue waiting
        }
    }

    /// Try to receive the next delivery without blocking.
    pub fn try_recv(&mut self) -> Result<Option<Delivery>, SubscriptionError> {
        loop {
            let delivery = match self.receiver.try_recv() {
                Ok(d) => d,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&delivery.notification.event) {
                return Ok(Some(delivery));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = Delivery;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(delivery)) => Poll::Ready(Some(delivery)),
            Ok(None) => {
                // No delivery ready; re-wake and return pending.
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChangeNotification, EventTopic, LedgerEvent};
    use crate::publisher::{EventPublisher, InMemoryEventBus};
    use shared_types::entities::{User, UserRole};
    use std::time::Duration;
    use tokio::time::timeout;

    fn user_created() -> ChangeNotification {
        ChangeNotification::new(LedgerEvent::UserCreated(User::new(
            "alice",
            "Alice A.",
            UserRole::User,
            0,
        )))
    }

    fn asset_deleted() -> ChangeNotification {
        ChangeNotification::new(LedgerEvent::AssetDeleted { asset_id: "A1".to_string() })
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(user_created()).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("delivery");

        assert!(matches!(received.notification.event, LedgerEvent::UserCreated(_)));
    }

    #[tokio::test]
    async fn test_subscription_filter_skips_other_topics() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::UserRegistry]));

        bus.publish(asset_deleted()).await;
        bus.publish(user_created()).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("delivery");

        assert!(matches!(received.notification.event, LedgerEvent::UserCreated(_)));
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_try_recv_delivery() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(user_created()).await;

        let result = sub.try_recv().unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_recv_none_after_bus_dropped() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        drop(bus);

        assert!(sub.recv().await.is_none());
    }
}
