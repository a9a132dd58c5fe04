//! Session resolution: mapping an opaque session identifier to a durable
//! chat identity, creating one idempotently on first contact.
//!
//! Creation enriches the row with geo data (degrading to sentinel values
//! when the lookup collaborator fails) and campaign attribution (written
//! at most once per identity). Concurrent first contacts from the same
//! session identifier resolve to a single stored row via the store-level
//! upsert; there is no in-process caching, every resolution re-reads the
//! store.

use std::sync::Arc;

use chatrelay_types::error::RepositoryError;
use chatrelay_types::visitor::{ChatIdentity, NewVisitor, DEFAULT_LANG, GEO_UNKNOWN, SUPPORTED_LANGS};
use chrono::Utc;
use tracing::{debug, warn};

use crate::collab::{ContactNotification, CrmNotifier, GeoLookup};
use crate::repository::VisitorRepository;

/// Sentinel client address when no usable forwarded header arrived.
pub const FALLBACK_CLIENT_ADDR: &str = "0.0.0.0";

/// Request-scoped session context carried from the HTTP/WS boundary.
#[derive(Debug, Clone)]
pub struct SessionScope {
    pub session_id: String,
    /// Normalized two-letter language code.
    pub lang: String,
    pub client_addr: String,
    /// Raw attribution query string (from the page path), if any.
    pub attribution: Option<String>,
}

/// Normalize a client language header to a supported two-letter tag.
///
/// Quality-weighted lists ("en-US,en;q=0.9") collapse to their first
/// two-letter tag; anything outside the supported set falls back to the
/// default language.
pub fn normalize_lang(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return DEFAULT_LANG.to_string(),
    };
    let first = raw.split(',').next().unwrap_or(raw);
    let tag = first.split(';').next().unwrap_or(first).trim();
    let two: String = tag.chars().take(2).flat_map(char::to_lowercase).collect();
    if SUPPORTED_LANGS.contains(&two.as_str()) {
        two
    } else {
        DEFAULT_LANG.to_string()
    }
}

/// Pick the client address out of forwarded headers.
///
/// `x-forwarded-for` may carry a comma-separated proxy chain; the first
/// entry long enough to be an address wins. Falls back to `x-real-ip`,
/// then to the sentinel address -- resolution never fails on headers.
pub fn client_addr(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    if let Some(chain) = forwarded_for {
        if let Some(addr) = chain
            .split(',')
            .map(str::trim)
            .find(|part| part.len() > 5)
        {
            return addr.to_string();
        }
    }
    match real_ip.map(str::trim) {
        Some(addr) if addr.len() > 5 => addr.to_string(),
        _ => FALLBACK_CLIENT_ADDR.to_string(),
    }
}

/// Wrap a raw attribution query string in the stored context format.
pub fn attribution_context(query: &str) -> String {
    serde_json::json!({ "utm": query }).to_string()
}

/// Extract the attribution URL from a stored context blob, empty if none.
pub fn attribution_url(context: Option<&str>) -> String {
    context
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .and_then(|value| value.get("utm").and_then(|v| v.as_str()).map(String::from))
        .unwrap_or_default()
}

/// Maps session identifiers to durable chat identities.
///
/// Generic over the visitor repository and the two collaborators so the
/// core crate never depends on infrastructure.
pub struct VisitorService<R: VisitorRepository, G: GeoLookup, C: CrmNotifier> {
    visitors: R,
    geo: G,
    crm: Arc<C>,
}

impl<R: VisitorRepository, G: GeoLookup, C: CrmNotifier> VisitorService<R, G, C> {
    pub fn new(visitors: R, geo: G, crm: Arc<C>) -> Self {
        Self { visitors, geo, crm }
    }

    /// Look up the identity for a session identifier.
    ///
    /// When the identity exists without attribution and the caller brought
    /// some, it is persisted now -- the one and only time it is written.
    pub async fn resolve(
        &self,
        session_id: &str,
        attribution: Option<&str>,
    ) -> Result<Option<ChatIdentity>, RepositoryError> {
        let Some(mut identity) = self.visitors.find_by_session(session_id).await? else {
            return Ok(None);
        };

        if identity.context.is_none() {
            if let Some(query) = attribution.filter(|q| !q.is_empty()) {
                let context = attribution_context(query);
                if self.visitors.set_context_once(session_id, &context).await? {
                    identity.context = Some(context);
                }
            }
        }

        Ok(Some(identity))
    }

    /// Resolve the identity for a session, creating one on first contact.
    pub async fn resolve_or_create(
        &self,
        scope: &SessionScope,
    ) -> Result<ChatIdentity, RepositoryError> {
        if let Some(identity) = self
            .resolve(&scope.session_id, scope.attribution.as_deref())
            .await?
        {
            return Ok(identity);
        }
        self.create_identity(scope, None, None, None).await
    }

    /// Complete an identity from a contact-form submission.
    ///
    /// A supplied name clears `is_default`; an absent one keeps the
    /// synthesized identity. The CRM is notified off the request path
    /// once the row has committed; its failure never propagates.
    pub async fn create_or_update_contact(
        &self,
        scope: &SessionScope,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<ChatIdentity, RepositoryError> {
        let identity = self
            .create_identity(scope, name, email.clone(), phone.clone())
            .await?;

        let notification = ContactNotification {
            channel_id: scope.session_id.clone(),
            name: identity.name.clone(),
            phone: phone.unwrap_or_default(),
            email: email.unwrap_or_default(),
        };
        let crm = Arc::clone(&self.crm);
        tokio::spawn(async move {
            if let Err(err) = crm.notify_contact(notification).await {
                warn!(error = %err, "CRM contact notification failed");
            }
        });

        Ok(identity)
    }

    async fn create_identity(
        &self,
        scope: &SessionScope,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<ChatIdentity, RepositoryError> {
        let (city, country) = match self.geo.lookup(&scope.client_addr).await {
            Some(geo) => (geo.city, geo.country),
            None => (GEO_UNKNOWN.to_string(), GEO_UNKNOWN.to_string()),
        };

        let is_default = name.is_none();
        let name = name.unwrap_or_else(|| format!("{city}-{}", Utc::now().timestamp()));
        debug!(%name, session_id = %scope.session_id, "materializing chat identity");

        let visitor = NewVisitor {
            session_id: scope.session_id.clone(),
            name,
            email,
            phone,
            city,
            country,
            lang: scope.lang.clone(),
            context: scope
                .attribution
                .as_deref()
                .filter(|q| !q.is_empty())
                .map(attribution_context),
            is_default,
            client_addr: scope.client_addr.clone(),
        };

        self.visitors.upsert(&visitor).await
    }
}
