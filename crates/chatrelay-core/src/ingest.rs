//! Message ingestion: persist a chat message, then fan it out on the
//! identity's broker channel.
//!
//! The store write always completes before the publish, so a reader who
//! saw the live event and immediately reloads history finds the same
//! message there. Publishing to a channel with no subscribers is fine;
//! the event is simply dropped.

use std::sync::Arc;

use chatrelay_types::error::IngestError;
use chatrelay_types::event::ChannelEvent;
use chatrelay_types::message::{ChatMessage, Direction, NewMessage};
use chrono::Utc;
use tracing::warn;

use crate::broker::ChannelBroker;
use crate::collab::{CrmNotifier, GeoLookup, MessageNotification};
use crate::repository::{MessageRepository, VisitorRepository};
use crate::visitor::{attribution_url, SessionScope, VisitorService};

/// Display name for anonymous visitor messages.
pub const ANON_AUTHOR: &str = "-";

/// Persists and publishes chat messages in both directions.
pub struct IngestService<R, G, C, M>
where
    R: VisitorRepository,
    G: GeoLookup,
    C: CrmNotifier,
    M: MessageRepository,
{
    visitors: Arc<VisitorService<R, G, C>>,
    messages: M,
    broker: Arc<ChannelBroker>,
    crm: Arc<C>,
}

impl<R, G, C, M> IngestService<R, G, C, M>
where
    R: VisitorRepository,
    G: GeoLookup,
    C: CrmNotifier,
    M: MessageRepository,
{
    pub fn new(
        visitors: Arc<VisitorService<R, G, C>>,
        messages: M,
        broker: Arc<ChannelBroker>,
        crm: Arc<C>,
    ) -> Self {
        Self {
            visitors,
            messages,
            broker,
            crm,
        }
    }

    /// Ingest a visitor message.
    ///
    /// Creates the chat identity on first contact, persists the message
    /// anonymously, publishes it to the session channel, and notifies the
    /// CRM off the request path.
    pub async fn ingest_inbound(
        &self,
        scope: &SessionScope,
        body: &str,
    ) -> Result<ChatMessage, IngestError> {
        let identity = self.visitors.resolve_or_create(scope).await?;

        let stored = self
            .messages
            .insert(&NewMessage {
                chat_id: identity.id,
                name: ANON_AUTHOR.to_string(),
                message: body.to_string(),
                direction: Direction::In,
                avatar: None,
                created_at: Utc::now().timestamp(),
            })
            .await?;

        self.broker.publish(ChannelEvent::Inbound {
            channel_id: identity.session_id.clone(),
            name: stored.name.clone(),
            message: stored.message.clone(),
            avatar: None,
            created_at: stored.created_at,
        });

        let notification = MessageNotification {
            channel_id: identity.session_id.clone(),
            lang: identity.lang.clone(),
            message: body.to_string(),
            url: attribution_url(identity.context.as_deref()),
        };
        let crm = Arc::clone(&self.crm);
        tokio::spawn(async move {
            if let Err(err) = crm.notify_message(notification).await {
                warn!(error = %err, "CRM message notification failed");
            }
        });

        Ok(stored)
    }

    /// Ingest an agent reply to an existing conversation.
    ///
    /// Unlike inbound ingestion this never creates an identity: replying
    /// to a session nobody has opened is an error.
    pub async fn ingest_outbound(
        &self,
        session_id: &str,
        name: &str,
        body: &str,
        avatar: Option<String>,
    ) -> Result<ChatMessage, IngestError> {
        let identity = self
            .visitors
            .resolve(session_id, None)
            .await?
            .ok_or_else(|| IngestError::UnknownSession(session_id.to_string()))?;

        let stored = self
            .messages
            .insert(&NewMessage {
                chat_id: identity.id,
                name: name.to_string(),
                message: body.to_string(),
                direction: Direction::Out,
                avatar: avatar.clone(),
                created_at: Utc::now().timestamp(),
            })
            .await?;

        self.broker.publish(ChannelEvent::Outbound {
            channel_id: identity.session_id.clone(),
            name: stored.name.clone(),
            message: stored.message.clone(),
            avatar,
            created_at: stored.created_at,
        });

        Ok(stored)
    }
}
