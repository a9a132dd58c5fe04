//! In-memory repository fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::{ApprovalStatus, ChatMessage, NewMessage};
use chatrelay_types::template::{IntroTemplate, WelcomeTemplate};

use crate::repository::{MessageRepository, TemplateRepository};

#[derive(Default)]
pub(crate) struct MemoryMessages {
    pub rows: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
}

impl MemoryMessages {
    /// Insert a fully-formed row, bypassing ingestion defaults. Lets tests
    /// plant unapproved or out-of-window messages.
    pub fn push_raw(&self, mut message: ChatMessage) {
        message.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.lock().unwrap().push(message);
    }
}

impl MessageRepository for MemoryMessages {
    async fn insert(&self, message: &NewMessage) -> Result<ChatMessage, RepositoryError> {
        let stored = ChatMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            chat_id: message.chat_id,
            name: message.name.clone(),
            message: message.message.clone(),
            direction: message.direction,
            avatar: message.avatar.clone(),
            status: ApprovalStatus::Approved,
            created_at: message.created_at,
        };
        self.rows.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent_approved(
        &self,
        chat_id: i64,
        since: i64,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let mut rows: Vec<ChatMessage> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                m.chat_id == chat_id
                    && m.status == ApprovalStatus::Approved
                    && m.created_at >= since
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn has_recent(&self, chat_id: i64, since: i64) -> Result<bool, RepositoryError> {
        Ok(!self.recent_approved(chat_id, since, 1).await?.is_empty())
    }

    async fn last_outbound(&self, chat_id: i64) -> Result<Option<ChatMessage>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                m.chat_id == chat_id
                    && m.status == ApprovalStatus::Approved
                    && m.direction == chatrelay_types::message::Direction::Out
            })
            .max_by_key(|m| m.id)
            .cloned())
    }
}

pub(crate) struct MemoryTemplates {
    welcomes: HashMap<String, WelcomeTemplate>,
    intros: HashMap<String, IntroTemplate>,
}

impl MemoryTemplates {
    pub fn seeded() -> Self {
        let mut welcomes = HashMap::new();
        welcomes.insert(
            "en".to_string(),
            WelcomeTemplate {
                lang: "en".to_string(),
                name: "Anna".to_string(),
                message: "Welcome! How can we help?".to_string(),
            },
        );
        let mut intros = HashMap::new();
        intros.insert(
            "en".to_string(),
            IntroTemplate {
                lang: "en".to_string(),
                message: "Hi there!".to_string(),
                quick_replies: vec!["Buy".to_string(), "Rent".to_string()],
            },
        );
        Self { welcomes, intros }
    }

    pub fn empty() -> Self {
        Self {
            welcomes: HashMap::new(),
            intros: HashMap::new(),
        }
    }
}

impl TemplateRepository for MemoryTemplates {
    async fn welcome(&self, lang: &str) -> Result<Option<WelcomeTemplate>, RepositoryError> {
        Ok(self.welcomes.get(lang).cloned())
    }

    async fn intro(&self, lang: &str) -> Result<Option<IntroTemplate>, RepositoryError> {
        Ok(self.intros.get(lang).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MemoryVisitors {
    pub rows: Mutex<HashMap<String, chatrelay_types::visitor::ChatIdentity>>,
    next_id: AtomicI64,
}

impl crate::repository::VisitorRepository for MemoryVisitors {
    async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<chatrelay_types::visitor::ChatIdentity>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(session_id).cloned())
    }

    async fn upsert(
        &self,
        visitor: &chatrelay_types::visitor::NewVisitor,
    ) -> Result<chatrelay_types::visitor::ChatIdentity, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.get_mut(&visitor.session_id) {
            existing.name = visitor.name.clone();
            existing.email = visitor.email.clone();
            existing.phone = visitor.phone.clone();
            existing.is_default = visitor.is_default;
            return Ok(existing.clone());
        }
        let identity = chatrelay_types::visitor::ChatIdentity {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: visitor.name.clone(),
            email: visitor.email.clone(),
            phone: visitor.phone.clone(),
            city: visitor.city.clone(),
            country: visitor.country.clone(),
            lang: visitor.lang.clone(),
            session_id: visitor.session_id.clone(),
            context: visitor.context.clone(),
            is_default: visitor.is_default,
            created_at: chrono::Utc::now(),
        };
        rows.insert(visitor.session_id.clone(), identity.clone());
        Ok(identity)
    }

    async fn set_context_once(
        &self,
        session_id: &str,
        context: &str,
    ) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(session_id) {
            Some(row) if row.context.is_none() => {
                row.context = Some(context.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub(crate) struct NoGeo;

impl crate::collab::GeoLookup for NoGeo {
    async fn lookup(&self, _addr: &str) -> Option<chatrelay_types::visitor::GeoInfo> {
        None
    }
}

pub(crate) struct CityGeo;

impl crate::collab::GeoLookup for CityGeo {
    async fn lookup(&self, _addr: &str) -> Option<chatrelay_types::visitor::GeoInfo> {
        Some(chatrelay_types::visitor::GeoInfo {
            city: "London".to_string(),
            country: "UK".to_string(),
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingCrm {
    pub contacts: Mutex<Vec<crate::collab::ContactNotification>>,
    pub messages: Mutex<Vec<crate::collab::MessageNotification>>,
}

impl crate::collab::CrmNotifier for RecordingCrm {
    async fn notify_contact(
        &self,
        notification: crate::collab::ContactNotification,
    ) -> Result<(), crate::collab::CollaboratorError> {
        self.contacts.lock().unwrap().push(notification);
        Ok(())
    }

    async fn notify_message(
        &self,
        notification: crate::collab::MessageNotification,
    ) -> Result<(), crate::collab::CollaboratorError> {
        self.messages.lock().unwrap().push(notification);
        Ok(())
    }
}

/// A chat identity fixture for service tests.
pub(crate) fn identity(id: i64, session_id: &str) -> chatrelay_types::visitor::ChatIdentity {
    chatrelay_types::visitor::ChatIdentity {
        id,
        name: format!("nowhere-{id}"),
        email: None,
        phone: None,
        city: "nowhere".to_string(),
        country: "nowhere".to_string(),
        lang: "en".to_string(),
        session_id: session_id.to_string(),
        context: None,
        is_default: true,
        created_at: chrono::Utc::now(),
    }
}
