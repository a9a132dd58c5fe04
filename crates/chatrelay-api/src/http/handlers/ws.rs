//! WebSocket relay handler.
//!
//! `GET /subscribe/{channel}` upgrades to a WebSocket and bridges the
//! channel's broker subscription to the client. The connection lifecycle:
//!
//! - **Authorize:** resolve the chat identity for the path channel; an
//!   unknown session is terminal and the connection closes without ever
//!   touching the broker.
//! - **Subscribe, then intro:** the broker subscription is taken before
//!   the intro publication is spawned, so the connection cannot miss its
//!   own `SYS` event.
//! - **Stream:** [`dispatch`] forwards channel events as JSON text frames
//!   and drains client frames as a liveness signal until the client goes
//!   away.
//! - **Close:** the registry entry is removed and dropping the receiver
//!   releases the subscription, whatever the exit path.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use chatrelay_core::ingest::ANON_AUTHOR;
use chatrelay_core::relay::{dispatch, RelayTransport};
use chatrelay_types::error::TransportClosed;
use chatrelay_types::event::ChannelEvent;

use crate::state::AppState;

/// Delay before the intro `SYS` event is published, giving the widget
/// time to finish its connection handshake.
const INTRO_DELAY: Duration = Duration::from_secs(1);

/// Upgrade an HTTP request to the relay WebSocket.
///
/// Mounted at `/subscribe/{channel}` in the router.
pub async fn subscribe(
    ws: WebSocketUpgrade,
    Path(channel): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_relay(socket, channel, state))
}

/// Axum WebSocket adapted to the core relay transport.
struct WsTransport {
    sender: SplitSink<WebSocket, Message>,
    receiver: SplitStream<WebSocket>,
}

impl RelayTransport for WsTransport {
    async fn send_event(&mut self, event: &ChannelEvent) -> Result<(), TransportClosed> {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize channel event");
                return Ok(());
            }
        };
        self.sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| TransportClosed)
    }

    async fn next_frame(&mut self) -> Option<()> {
        match self.receiver.next().await {
            Some(Ok(Message::Close(_))) | None => None,
            Some(Err(err)) => {
                tracing::debug!(error = %err, "WebSocket receive error");
                None
            }
            // Text, binary, ping, pong: liveness only.
            Some(Ok(_)) => Some(()),
        }
    }
}

/// Authorize the connection and open its broker subscription.
///
/// An unknown session is terminal: the broker is never touched and the
/// caller closes the socket. On success the subscription is taken before
/// the intro publication is spawned, so the returned receiver cannot miss
/// the `SYS` event.
async fn open_stream(
    state: &AppState,
    channel: &str,
) -> Option<broadcast::Receiver<ChannelEvent>> {
    let identity = match state.visitor_service.resolve(channel, None).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            tracing::info!(%channel, "rejecting relay connection for unknown session");
            return None;
        }
        Err(err) => {
            tracing::error!(%channel, error = %err, "session resolution failed");
            return None;
        }
    };

    let events = state.broker.subscribe(channel);

    let state = state.clone();
    let channel = channel.to_string();
    tokio::spawn(async move {
        tokio::time::sleep(INTRO_DELAY).await;
        match state.intro_service.intro(&identity).await {
            Ok(intro) => {
                state.broker.publish(ChannelEvent::System {
                    channel_id: channel.clone(),
                    name: ANON_AUTHOR.to_string(),
                    message: String::new(),
                    is_default: identity.is_default,
                    intro,
                    created_at: Utc::now().timestamp(),
                });
            }
            Err(err) => {
                tracing::error!(%channel, error = %err, "intro assembly failed");
            }
        }
    });

    Some(events)
}

async fn handle_relay(mut socket: WebSocket, channel: String, state: AppState) {
    let Some(events) = open_stream(&state, &channel).await else {
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    let conn_id = state.connections.accept(&channel);

    let (sender, receiver) = socket.split();
    let mut transport = WsTransport { sender, receiver };
    let end = dispatch(events, &channel, &mut transport).await;

    state.connections.remove(&conn_id);
    // dispatch consumed the receiver; an idle channel can go away now.
    state.broker.release(&channel);
    tracing::debug!(%channel, ?end, "relay connection closed");
}
