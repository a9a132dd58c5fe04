//! HTTP and WebSocket request handlers.

pub mod chat;
pub mod health;
pub mod operator;
pub mod ws;
