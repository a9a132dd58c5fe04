//! Repository trait definitions.
//!
//! Implementations live in `chatrelay-infra`. All traits use native
//! async fn in traits (RPITIT, Rust 2024 edition).

pub mod message;
pub mod template;
pub mod visitor;

pub use message::MessageRepository;
pub use template::TemplateRepository;
pub use visitor::VisitorRepository;
