//! Business logic for the chatrelay service.
//!
//! This crate owns the seams of the system: repository traits implemented
//! by `chatrelay-infra`, collaborator traits for the geo and CRM services,
//! the in-process channel broker, and the per-connection relay loop. The
//! services here (session resolver, history aggregator, intro assembler,
//! message ingestor) are generic over those traits and never depend on
//! infrastructure crates.

pub mod broker;
pub mod collab;
pub mod connection;
pub mod history;
pub mod ingest;
pub mod intro;
pub mod relay;
pub mod repository;
pub mod visitor;

#[cfg(test)]
pub(crate) mod testutil;
