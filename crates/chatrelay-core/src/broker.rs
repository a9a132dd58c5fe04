//! In-process publish/subscribe broker with one channel per session.
//!
//! Channels are named `broadcast` channels created lazily on first
//! subscribe or publish. Dropping a receiver releases the subscription
//! and `subscriber_count` reflects that immediately.

use chatrelay_types::event::ChannelEvent;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

/// Default buffer size for per-channel broadcast queues.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Central pub/sub broker keyed by session identifier.
pub struct ChannelBroker {
    channels: DashMap<String, broadcast::Sender<ChannelEvent>>,
    capacity: usize,
}

impl ChannelBroker {
    /// Create a broker whose channels buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a channel, creating it if it does not exist.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<ChannelEvent> {
        let entry = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            });
        entry.subscribe()
    }

    /// Publish an event to the channel named by its `channel_id`.
    ///
    /// Returns the number of subscribers it was delivered to; with no
    /// active subscribers the event is silently dropped and the idle
    /// channel entry is pruned.
    pub fn publish(&self, event: ChannelEvent) -> usize {
        let channel = event.channel_id().to_string();
        let delivered = match self.channels.get(&channel) {
            Some(sender) => match sender.send(event) {
                Ok(count) => {
                    debug!(%channel, count, "published event to channel");
                    count
                }
                Err(_) => {
                    debug!(%channel, "no active subscribers on channel");
                    0
                }
            },
            None => {
                debug!(%channel, "channel does not exist, event dropped");
                return 0;
            }
        };
        if delivered == 0 {
            self.release(&channel);
        }
        delivered
    }

    /// Drop the channel entry when nothing subscribes to it anymore.
    ///
    /// Callers release a channel on relay teardown; the check-and-remove
    /// holds the shard entry, so a concurrent subscribe either lands
    /// before the check or recreates the channel afterwards.
    pub fn release(&self, channel: &str) {
        let removed = self
            .channels
            .remove_if(channel, |_, sender| sender.receiver_count() == 0);
        if removed.is_some() {
            debug!(%channel, "released idle channel");
        }
    }

    /// Number of live subscriptions on a channel.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Number of channels currently held.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for ChannelBroker {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl std::fmt::Debug for ChannelBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelBroker")
            .field("channels", &self.channels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(channel: &str, body: &str) -> ChannelEvent {
        ChannelEvent::Inbound {
            channel_id: channel.to_string(),
            name: "-".to_string(),
            message: body.to_string(),
            avatar: None,
            created_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn publish_reaches_all_channel_subscribers() {
        let broker = ChannelBroker::default();
        let mut rx1 = broker.subscribe("s-1");
        let mut rx2 = broker.subscribe("s-1");

        let delivered = broker.publish(inbound("s-1", "hello"));
        assert_eq!(delivered, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                ChannelEvent::Inbound { message, .. } => assert_eq!(message, "hello"),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn events_stay_on_their_own_channel() {
        let broker = ChannelBroker::default();
        let mut rx_other = broker.subscribe("s-2");

        broker.publish(inbound("s-1", "hello"));
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_drops_event() {
        let broker = ChannelBroker::default();
        assert_eq!(broker.publish(inbound("nobody", "hi")), 0);
    }

    #[tokio::test]
    async fn subscriber_count_tracks_receiver_drops() {
        let broker = ChannelBroker::default();
        assert_eq!(broker.subscriber_count("s-1"), 0);

        let rx = broker.subscribe("s-1");
        assert_eq!(broker.subscriber_count("s-1"), 1);

        drop(rx);
        assert_eq!(broker.subscriber_count("s-1"), 0);
    }

    #[tokio::test]
    async fn release_prunes_channels_without_subscribers() {
        let broker = ChannelBroker::default();
        for i in 0..100 {
            let channel = format!("s-{i}");
            drop(broker.subscribe(&channel));
            broker.release(&channel);
        }
        assert_eq!(broker.channel_count(), 0);
    }

    #[tokio::test]
    async fn release_keeps_channels_with_live_subscribers() {
        let broker = ChannelBroker::default();
        let _rx = broker.subscribe("s-1");

        broker.release("s-1");
        assert_eq!(broker.channel_count(), 1);
        assert_eq!(broker.subscriber_count("s-1"), 1);
    }

    #[tokio::test]
    async fn publish_to_abandoned_channel_prunes_the_entry() {
        let broker = ChannelBroker::default();
        drop(broker.subscribe("s-1"));
        assert_eq!(broker.channel_count(), 1);

        assert_eq!(broker.publish(inbound("s-1", "hi")), 0);
        assert_eq!(broker.channel_count(), 0);
    }
}
