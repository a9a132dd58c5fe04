//! Per-connection relay loop between a broker channel and one client.
//!
//! The transport boundary is the [`RelayTransport`] trait; the axum
//! WebSocket adapter lives in `chatrelay-api`, and tests drive the loop
//! with a channel-backed mock.
//!
//! The dispatch loop multiplexes two activities in a single task:
//! forwarding broker events to the client, and draining client frames
//! purely as a liveness signal (there is no semantic inbound protocol on
//! the socket). The client going away is the sole cancellation trigger;
//! the broadcast receiver is owned by the loop, so the subscription is
//! released on every exit path, faults included.

use chatrelay_types::error::TransportClosed;
use chatrelay_types::event::ChannelEvent;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// One client connection as the relay loop sees it.
pub trait RelayTransport: Send {
    /// Send one event to the client. `Err` means the transport is closed.
    fn send_event(
        &mut self,
        event: &ChannelEvent,
    ) -> impl std::future::Future<Output = Result<(), TransportClosed>> + Send;

    /// Wait for the next client frame. The frame content is discarded;
    /// `None` means the client disconnected (normally or abnormally).
    fn next_frame(&mut self) -> impl std::future::Future<Output = Option<()>> + Send;
}

/// Why the dispatch loop ended. All of these are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The inbound-drain activity observed the client going away.
    ClientDisconnected,
    /// An outbound send hit a closed socket.
    SendFailed,
    /// The broker channel sender was dropped (process shutting down).
    BrokerClosed,
}

/// Forward broker events to the client until it disconnects.
///
/// An event is forwarded only when its `channel_id` equals this
/// connection's channel; anything else is broker cross-talk and is
/// dropped. Consumes the subscription receiver so it is released when the
/// loop returns, whatever the exit path.
pub async fn dispatch<T: RelayTransport>(
    mut events: broadcast::Receiver<ChannelEvent>,
    channel: &str,
    transport: &mut T,
) -> RelayEnd {
    let end = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if event.channel_id() != channel {
                        warn!(
                            %channel,
                            event_channel = %event.channel_id(),
                            "dropping cross-channel event"
                        );
                        continue;
                    }
                    if transport.send_event(&event).await.is_err() {
                        break RelayEnd::SendFailed;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(%channel, skipped, "relay subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break RelayEnd::BrokerClosed;
                }
            },
            frame = transport.next_frame() => match frame {
                // Client frames carry no protocol, only liveness.
                Some(()) => {}
                None => break RelayEnd::ClientDisconnected,
            },
        }
    };

    debug!(%channel, ?end, "relay dispatch finished");
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::ChannelBroker;
    use chatrelay_types::event::ChannelEvent;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockTransport {
        frames: mpsc::Receiver<()>,
        sent: Vec<ChannelEvent>,
    }

    impl RelayTransport for MockTransport {
        async fn send_event(&mut self, event: &ChannelEvent) -> Result<(), TransportClosed> {
            self.sent.push(event.clone());
            Ok(())
        }

        async fn next_frame(&mut self) -> Option<()> {
            self.frames.recv().await
        }
    }

    fn outbound(channel: &str, body: &str) -> ChannelEvent {
        ChannelEvent::Outbound {
            channel_id: channel.to_string(),
            name: "Anna".to_string(),
            message: body.to_string(),
            avatar: None,
            created_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn forwards_matching_events_until_client_disconnects() {
        let broker = ChannelBroker::default();
        let events = broker.subscribe("s-1");
        let (frames_tx, frames_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            let mut transport = MockTransport {
                frames: frames_rx,
                sent: Vec::new(),
            };
            let end = dispatch(events, "s-1", &mut transport).await;
            (end, transport.sent)
        });

        broker.publish(outbound("s-1", "first"));
        broker.publish(outbound("s-1", "second"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(frames_tx);

        let (end, sent) = handle.await.unwrap();
        assert_eq!(end, RelayEnd::ClientDisconnected);
        let bodies: Vec<_> = sent
            .iter()
            .map(|e| match e {
                ChannelEvent::Outbound { message, .. } => message.clone(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn filters_events_from_other_channels() {
        // Hand the dispatch loop a receiver that sees foreign traffic so
        // the channel filter is hit directly.
        let (tx, rx) = broadcast::channel(8);
        let (frames_tx, frames_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            let mut transport = MockTransport {
                frames: frames_rx,
                sent: Vec::new(),
            };
            let end = dispatch(rx, "s-1", &mut transport).await;
            (end, transport.sent)
        });

        tx.send(outbound("s-2", "cross-talk")).unwrap();
        tx.send(outbound("s-1", "mine")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(frames_tx);

        let (end, sent) = handle.await.unwrap();
        assert_eq!(end, RelayEnd::ClientDisconnected);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id(), "s-1");
    }

    #[tokio::test]
    async fn client_disconnect_releases_the_subscription() {
        let broker = std::sync::Arc::new(ChannelBroker::default());
        assert_eq!(broker.subscriber_count("s-1"), 0);

        let events = broker.subscribe("s-1");
        assert_eq!(broker.subscriber_count("s-1"), 1);

        let (frames_tx, frames_rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut transport = MockTransport {
                frames: frames_rx,
                sent: Vec::new(),
            };
            dispatch(events, "s-1", &mut transport).await
        });

        drop(frames_tx);
        let end = handle.await.unwrap();
        assert_eq!(end, RelayEnd::ClientDisconnected);
        assert_eq!(broker.subscriber_count("s-1"), 0);
    }

    #[tokio::test]
    async fn broker_shutdown_ends_the_loop() {
        let (tx, rx) = broadcast::channel::<ChannelEvent>(8);
        let (_frames_tx, frames_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut transport = MockTransport {
                frames: frames_rx,
                sent: Vec::new(),
            };
            dispatch(rx, "s-1", &mut transport).await
        });

        drop(tx);
        let end = handle.await.unwrap();
        assert_eq!(end, RelayEnd::BrokerClosed);
    }

    #[tokio::test]
    async fn send_failure_ends_the_loop() {
        struct ClosedTransport {
            frames: mpsc::Receiver<()>,
        }

        impl RelayTransport for ClosedTransport {
            async fn send_event(&mut self, _: &ChannelEvent) -> Result<(), TransportClosed> {
                Err(TransportClosed)
            }

            async fn next_frame(&mut self) -> Option<()> {
                self.frames.recv().await
            }
        }

        let broker = ChannelBroker::default();
        let events = broker.subscribe("s-1");
        let (_frames_tx, frames_rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut transport = ClosedTransport { frames: frames_rx };
            dispatch(events, "s-1", &mut transport).await
        });

        broker.publish(outbound("s-1", "undeliverable"));
        let end = handle.await.unwrap();
        assert_eq!(end, RelayEnd::SendFailed);
        assert_eq!(broker.subscriber_count("s-1"), 0);
    }
}
