//! HTTP/WebSocket layer for chatrelay.
//!
//! Axum-based API mirroring the browser widget's wire contract: session
//! identity rides in headers, validation failures come back as
//! `{"detail": ...}` bodies, and `/subscribe/{channel}` upgrades to the
//! relay WebSocket.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
