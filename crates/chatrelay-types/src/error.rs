use thiserror::Error;

/// Errors from repository operations (trait definitions live in chatrelay-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Fatal configuration faults: a supported language without its reference
/// template row. Recovering silently would corrupt the user-facing
/// conversation, so these propagate all the way out.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no welcome template configured for language '{0}'")]
    MissingWelcome(String),

    #[error("no intro template configured for language '{0}'")]
    MissingIntro(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from message ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Outbound ingestion never creates identities implicitly.
    #[error("no chat identity for session '{0}'")]
    UnknownSession(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// The client side of a relay transport went away mid-send.
///
/// Treated as normal termination of the relay state machine, never
/// propagated as a failure to any caller.
#[derive(Debug, Error)]
#[error("client transport closed")]
pub struct TransportClosed;
