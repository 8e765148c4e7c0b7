//! Long-lived consumer loop driving a [`Projector`] from a subscription.

use crate::ports::IndexError;
use crate::service::Projector;
use shared_bus::Subscription;
use shared_types::time::TimeSource;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Delay before re-attempting a delivery the index refused.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Single consumer of the notification feed.
///
/// A delivery is acknowledged (its ordinal recorded) only once the index
/// accepted it; an unavailable index blocks on that one delivery with
/// retries rather than skipping it. Shutdown via the watch channel
/// finishes or abandons the in-flight delivery and exits without
/// acknowledging anything further.
pub struct ProjectorRunner<T: TimeSource> {
    subscription: Subscription,
    projector: Projector<T>,
    shutdown: watch::Receiver<bool>,
    last_acked: Option<u64>,
}

impl<T: TimeSource> ProjectorRunner<T> {
    pub fn new(
        subscription: Subscription,
        projector: Projector<T>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self { subscription, projector, shutdown, last_acked: None }
    }

    /// Ordinal of the last acknowledged delivery, if any.
    pub fn last_acked(&self) -> Option<u64> {
        self.last_acked
    }

    /// Consume until the bus closes or shutdown is signalled. Returns the
    /// runner so callers can inspect the final acknowledged position.
    pub async fn run(mut self) -> Self {
        loop {
            let delivery = tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        info!(last_acked = ?self.last_acked, "Projector shutting down");
                        break;
                    }
                    continue;
                }
                received = self.subscription.recv() => match received {
                    Some(d) => d,
                    None => {
                        info!(last_acked = ?self.last_acked, "Bus closed, projector stopping");
                        break;
                    }
                },
            };

            if self.settle(&delivery).await {
                self.last_acked = Some(delivery.ordinal);
            } else {
                // Shutdown arrived mid-retry; the unacknowledged delivery
                // will be replayed by the next run.
                break;
            }
        }
        self
    }

    /// Apply one delivery, retrying while the index is unavailable.
    /// Returns false if shutdown interrupted the retries.
    async fn settle(&mut self, delivery: &shared_bus::Delivery) -> bool {
        loop {
            match self.projector.apply(delivery).await {
                Ok(()) => return true,
                Err(IndexError::Unavailable(reason)) | Err(IndexError::Rejected(reason)) => {
                    warn!(
                        ordinal = delivery.ordinal,
                        reason, "Index write failed, retrying"
                    );
                }
            }

            tokio::select! {
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        return false;
                    }
                }
                () = tokio::time::sleep(RETRY_DELAY) => {}
            }
        }
    }
}
