//! The broadcast hub: in-process publish/subscribe for the live feed.
//!
//! A thin wrapper over [`tokio::sync::broadcast`] with an explicit
//! subscribe lifecycle -- a subscription ends when its receiver is dropped,
//! which the feed endpoint ties to connection teardown. Nothing is
//! persisted and late subscribers get no history replay.
//!
//! Delivery order per subscriber equals publish order. A subscriber that
//! falls more than [`BROADCAST_CAPACITY`] messages behind observes a
//! `Lagged` gap and resumes at the newest message; publishing never blocks
//! on slow consumers.

use tally_types::FeedMessage;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel.
///
/// A subscriber lagging by more than this many messages receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
pub const BROADCAST_CAPACITY: usize = 256;

/// In-process publish/subscribe channel for feed messages.
#[derive(Debug)]
pub struct BroadcastHub {
    tx: broadcast::Sender<FeedMessage>,
}

impl BroadcastHub {
    /// Create a hub with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    /// Create a hub with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all messages published from this moment on.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedMessage> {
        self.tx.subscribe()
    }

    /// Publish a message to every current subscriber.
    ///
    /// Returns the number of subscribers the message reached. Zero simply
    /// means nobody is listening right now -- never an error, and never a
    /// reason to fail the mutation that triggered the publish.
    pub fn publish(&self, message: FeedMessage) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    /// Number of currently-attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tally_types::Stats;

    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscriber_in_order() {
        let hub = BroadcastHub::new();
        let mut rx = hub.subscribe();

        let reached = hub.publish(FeedMessage::Connected);
        assert_eq!(reached, 1);
        hub.publish(FeedMessage::Stats(Stats {
            users: 1,
            events: 1,
            points: 1,
        }));

        assert_eq!(rx.recv().await.ok(), Some(FeedMessage::Connected));
        let second = rx.recv().await.ok();
        assert!(matches!(second, Some(FeedMessage::Stats(_))));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.publish(FeedMessage::Connected), 0);
    }

    #[tokio::test]
    async fn dropped_receiver_leaves_the_hub() {
        let hub = BroadcastHub::new();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn late_subscriber_sees_no_history() {
        let hub = BroadcastHub::new();
        hub.publish(FeedMessage::Connected);

        let mut rx = hub.subscribe();
        hub.publish(FeedMessage::Stats(Stats::default()));

        let first = rx.recv().await.ok();
        assert!(matches!(first, Some(FeedMessage::Stats(_))));
    }
}
