//! Chat message types.
//!
//! Messages belong to exactly one [`ChatIdentity`](crate::visitor::ChatIdentity)
//! and are created once by ingestion, never mutated or deleted. Timestamps
//! are unix seconds: that is the wire format the browser widget consumes
//! and what the trailing-window history queries compute against.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Message direction relative to the visitor.
///
/// `In` and `Out` are persisted; `Sys` exists only on the live event
/// stream for non-persisted system events such as intro delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "SYS")]
    Sys,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
            Direction::Sys => write!(f, "SYS"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            "SYS" => Ok(Direction::Sys),
            other => Err(format!("invalid message direction: '{other}'")),
        }
    }
}

/// Moderation status; only `Approved` messages are visible in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    #[serde(rename = "APPROVED")]
    Approved,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Approved => write!(f, "APPROVED"),
            ApprovalStatus::Pending => write!(f, "PENDING"),
            ApprovalStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "PENDING" => Ok(ApprovalStatus::Pending),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("invalid approval status: '{other}'")),
        }
    }
}

/// A single persisted chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Store-assigned, immutable.
    pub id: i64,
    /// Owning chat identity.
    pub chat_id: i64,
    /// Author display name ("-" for anonymous visitor messages).
    pub name: String,
    pub message: String,
    pub direction: Direction,
    pub avatar: Option<String>,
    #[serde(skip_serializing, default = "default_status")]
    pub status: ApprovalStatus,
    /// Unix seconds.
    pub created_at: i64,
}

fn default_status() -> ApprovalStatus {
    ApprovalStatus::Approved
}

/// Parameters for persisting a new message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub chat_id: i64,
    pub name: String,
    pub message: String,
    pub direction: Direction,
    pub avatar: Option<String>,
    pub created_at: i64,
}
