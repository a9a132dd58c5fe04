//! Shared domain types for the chatrelay service.
//!
//! This crate contains the records materialized from the relational store
//! (chat identities, messages, templates), the broker wire payload
//! (`ChannelEvent`), and the error types shared across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod error;
pub mod event;
pub mod message;
pub mod template;
pub mod visitor;
