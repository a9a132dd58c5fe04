//! Chat-history reconstruction with the welcome-message fallback.
//!
//! History is the up-to-15 most recent approved messages created within
//! the trailing 24 hours, fetched newest-first from the store and
//! presented oldest-first in the conversation's reading order. A window
//! with zero messages yields
//! exactly one synthesized welcome entry so callers never special-case an
//! empty conversation.

use chatrelay_types::error::TemplateError;
use chatrelay_types::message::{ApprovalStatus, ChatMessage, Direction};
use chatrelay_types::visitor::ChatIdentity;
use chrono::Utc;

use crate::repository::{MessageRepository, TemplateRepository};

/// Maximum entries one history reconstruction returns.
pub const HISTORY_LIMIT: i64 = 15;

/// Trailing window, in seconds, a message stays part of the live history.
pub const HISTORY_WINDOW_SECS: i64 = 86_400;

/// Rebuilds the ordered message list for a chat identity.
pub struct HistoryService<M: MessageRepository, T: TemplateRepository> {
    messages: M,
    templates: T,
    /// Fixed avatar reference attached to synthesized agent entries.
    agent_avatar: String,
}

impl<M: MessageRepository, T: TemplateRepository> HistoryService<M, T> {
    pub fn new(messages: M, templates: T, agent_avatar: String) -> Self {
        Self {
            messages,
            templates,
            agent_avatar,
        }
    }

    /// The conversation history for an identity, oldest first.
    ///
    /// A missing welcome template for the identity's language is a fatal
    /// configuration error and propagates.
    pub async fn history(
        &self,
        identity: &ChatIdentity,
    ) -> Result<Vec<ChatMessage>, TemplateError> {
        let since = Utc::now().timestamp() - HISTORY_WINDOW_SECS;
        let mut records = self
            .messages
            .recent_approved(identity.id, since, HISTORY_LIMIT)
            .await?;

        if records.is_empty() {
            let welcome = self
                .templates
                .welcome(&identity.lang)
                .await?
                .ok_or_else(|| TemplateError::MissingWelcome(identity.lang.clone()))?;
            return Ok(vec![ChatMessage {
                id: 0,
                chat_id: 0,
                name: welcome.name,
                message: welcome.message,
                direction: Direction::Out,
                avatar: Some(self.agent_avatar.clone()),
                status: ApprovalStatus::Approved,
                created_at: Utc::now().timestamp(),
            }]);
        }

        // Stored newest-first; presented oldest-first.
        records.reverse();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{identity, MemoryMessages, MemoryTemplates};
    use chatrelay_types::message::NewMessage;

    fn service(messages: MemoryMessages) -> HistoryService<MemoryMessages, MemoryTemplates> {
        HistoryService::new(
            messages,
            MemoryTemplates::seeded(),
            "https://cdn.example/agent/anna.jpg".to_string(),
        )
    }

    fn new_message(chat_id: i64, body: &str, created_at: i64) -> NewMessage {
        NewMessage {
            chat_id,
            name: "-".to_string(),
            message: body.to_string(),
            direction: Direction::In,
            avatar: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn empty_window_synthesizes_single_welcome_entry() {
        let service = service(MemoryMessages::default());
        let history = service.history(&identity(1, "s-1")).await.unwrap();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].direction, Direction::Out);
        assert_eq!(history[0].name, "Anna");
        assert_eq!(history[0].message, "Welcome! How can we help?");
        assert!(history[0].avatar.as_deref().unwrap().ends_with("anna.jpg"));
    }

    #[tokio::test]
    async fn returns_oldest_first() {
        let messages = MemoryMessages::default();
        let now = Utc::now().timestamp();
        for (i, body) in ["first", "second", "third"].iter().enumerate() {
            messages
                .insert(&new_message(1, body, now - 10 + i as i64))
                .await
                .unwrap();
        }

        let service = service(messages);
        let history = service.history(&identity(1, "s-1")).await.unwrap();
        let bodies: Vec<_> = history.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn caps_at_fifteen_most_recent() {
        let messages = MemoryMessages::default();
        let now = Utc::now().timestamp();
        for i in 0..20 {
            messages
                .insert(&new_message(1, &format!("m{i}"), now - 100 + i))
                .await
                .unwrap();
        }

        let service = service(messages);
        let history = service.history(&identity(1, "s-1")).await.unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT as usize);
        // The five oldest fell off; the oldest survivor is m5.
        assert_eq!(history[0].message, "m5");
        assert_eq!(history.last().unwrap().message, "m19");
    }

    #[tokio::test]
    async fn window_excludes_stale_and_unapproved_messages() {
        let messages = MemoryMessages::default();
        let now = Utc::now().timestamp();
        messages
            .insert(&new_message(1, "stale", now - HISTORY_WINDOW_SECS - 60))
            .await
            .unwrap();
        messages.push_raw(ChatMessage {
            id: 0,
            chat_id: 1,
            name: "-".to_string(),
            message: "unapproved".to_string(),
            direction: Direction::In,
            avatar: None,
            status: ApprovalStatus::Pending,
            created_at: now,
        });

        let service = service(messages);
        let history = service.history(&identity(1, "s-1")).await.unwrap();
        // Nothing qualified, so the welcome fallback applies.
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].direction, Direction::Out);
        assert_ne!(history[0].message, "stale");
        assert_ne!(history[0].message, "unapproved");
    }

    #[tokio::test]
    async fn missing_welcome_template_is_fatal() {
        let service = HistoryService::new(
            MemoryMessages::default(),
            MemoryTemplates::empty(),
            "avatar".to_string(),
        );
        let err = service.history(&identity(1, "s-1")).await.unwrap_err();
        assert!(matches!(err, TemplateError::MissingWelcome(lang) if lang == "en"));
    }
}
