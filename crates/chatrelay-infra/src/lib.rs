//! Infrastructure adapters for chatrelay.
//!
//! Concrete implementations of the repository and collaborator traits
//! defined in `chatrelay-core`: SQLite storage with split read/write
//! pools, and HTTP clients for the geo lookup and CRM webhook services.

pub mod config;
pub mod crm;
pub mod geo;
pub mod sqlite;
