//! Core types for the memory system
//!
//! Defines the persisted transcript record, the read-path message and
//! search-hit shapes, and the per-request context bundle.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::Metadata;

/// Who produced a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// The persisted form of a turn in the short-term window.
///
/// The timestamp is assigned at write time, not supplied by the caller.
/// Deserialization is lenient: a record missing `role` or `content`
/// decodes with `user` / empty defaults rather than failing the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Seconds since the Unix epoch, assigned at write time
    #[serde(default)]
    pub timestamp: i64,
}

fn default_role() -> Role {
    Role::User
}

impl StoredMessage {
    /// Create a record stamped with the current time.
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// A read-path transcript pair: who said what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Self {
            role: stored.role,
            content: stored.content,
        }
    }
}

/// One long-term search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryHit {
    /// The stored text
    pub text: String,
    /// Similarity score, passed through from the index verbatim
    pub score: f32,
    /// Record metadata with the `text` key removed
    pub metadata: Metadata,
}

/// The combined read-path output assembled per request: recent history
/// plus semantically relevant past turns. Constructed fresh per call,
/// never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContextBundle {
    pub history: Vec<Message>,
    pub relevant_memories: Vec<MemoryHit>,
}
