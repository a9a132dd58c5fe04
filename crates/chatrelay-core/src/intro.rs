//! Conversation-opener assembly.
//!
//! The intro payload pairs the language-scoped intro template with the
//! author identity of the most recent agent message, falling back to the
//! default agent. The last-agent-message fetch only runs when the
//! conversation has traffic inside the history window.

use chatrelay_types::error::TemplateError;
use chatrelay_types::template::IntroPayload;
use chatrelay_types::visitor::ChatIdentity;
use chrono::Utc;

use crate::history::HISTORY_WINDOW_SECS;
use crate::repository::{MessageRepository, TemplateRepository};

/// Display name used when no agent has written in this conversation yet.
pub const DEFAULT_AGENT_NAME: &str = "Anna";

/// Builds the once-per-connection conversation opener.
pub struct IntroService<M: MessageRepository, T: TemplateRepository> {
    messages: M,
    templates: T,
    agent_avatar: String,
}

impl<M: MessageRepository, T: TemplateRepository> IntroService<M, T> {
    pub fn new(messages: M, templates: T, agent_avatar: String) -> Self {
        Self {
            messages,
            templates,
            agent_avatar,
        }
    }

    /// Assemble the intro payload for an identity.
    ///
    /// A missing intro template for the identity's language is a fatal
    /// configuration error and propagates.
    pub async fn intro(&self, identity: &ChatIdentity) -> Result<IntroPayload, TemplateError> {
        let template = self
            .templates
            .intro(&identity.lang)
            .await?
            .ok_or_else(|| TemplateError::MissingIntro(identity.lang.clone()))?;

        let since = Utc::now().timestamp() - HISTORY_WINDOW_SECS;
        let last_agent = if self.messages.has_recent(identity.id, since).await? {
            self.messages.last_outbound(identity.id).await?
        } else {
            None
        };

        let (name, avatar) = match last_agent {
            Some(message) => (message.name, message.avatar),
            None => (
                DEFAULT_AGENT_NAME.to_string(),
                Some(self.agent_avatar.clone()),
            ),
        };

        Ok(IntroPayload {
            name,
            avatar,
            message: template.message,
            quick_replies: template.quick_replies,
            lang: template.lang,
        })
    }
}
