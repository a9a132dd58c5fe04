//! Application state wiring all services together.
//!
//! Services are generic over repository/collaborator traits; AppState pins
//! them to the concrete infra implementations so handlers share one set of
//! type aliases.

use std::sync::Arc;

use chatrelay_core::broker::ChannelBroker;
use chatrelay_core::connection::ConnectionManager;
use chatrelay_core::history::HistoryService;
use chatrelay_core::ingest::IngestService;
use chatrelay_core::intro::IntroService;
use chatrelay_core::visitor::VisitorService;
use chatrelay_infra::config::Settings;
use chatrelay_infra::crm::HttpCrmNotifier;
use chatrelay_infra::geo::HttpGeoLookup;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_infra::sqlite::{
    SqliteMessageRepository, SqliteTemplateRepository, SqliteVisitorRepository,
};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteVisitorService =
    VisitorService<SqliteVisitorRepository, HttpGeoLookup, HttpCrmNotifier>;

pub type ConcreteHistoryService =
    HistoryService<SqliteMessageRepository, SqliteTemplateRepository>;

pub type ConcreteIntroService = IntroService<SqliteMessageRepository, SqliteTemplateRepository>;

pub type ConcreteIngestService = IngestService<
    SqliteVisitorRepository,
    HttpGeoLookup,
    HttpCrmNotifier,
    SqliteMessageRepository,
>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub visitor_service: Arc<ConcreteVisitorService>,
    pub history_service: Arc<ConcreteHistoryService>,
    pub intro_service: Arc<ConcreteIntroService>,
    pub ingest_service: Arc<ConcreteIngestService>,
    pub broker: Arc<ChannelBroker>,
    pub connections: Arc<ConnectionManager>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&settings.database_url).await?;

        let broker = Arc::new(ChannelBroker::new(settings.broker_capacity));
        let connections = Arc::new(ConnectionManager::new());

        let crm = Arc::new(HttpCrmNotifier::new(settings.crm_base_url.clone()));
        let geo = match &settings.geo_base_url {
            Some(base) => HttpGeoLookup::new().with_base_url(base.clone()),
            None => HttpGeoLookup::new(),
        };

        let visitor_service = Arc::new(VisitorService::new(
            SqliteVisitorRepository::new(db_pool.clone()),
            geo,
            Arc::clone(&crm),
        ));

        let agent_avatar = settings.agent_avatar();
        let history_service = Arc::new(HistoryService::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteTemplateRepository::new(db_pool.clone()),
            agent_avatar.clone(),
        ));
        let intro_service = Arc::new(IntroService::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteTemplateRepository::new(db_pool.clone()),
            agent_avatar,
        ));

        let ingest_service = Arc::new(IngestService::new(
            Arc::clone(&visitor_service),
            SqliteMessageRepository::new(db_pool.clone()),
            Arc::clone(&broker),
            crm,
        ));

        Ok(Self {
            visitor_service,
            history_service,
            intro_service,
            ingest_service,
            broker,
            connections,
            db_pool,
        })
    }
}
