//! Message model representing one turn in a mentor conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the student.
    User,
    /// Reply from the mentor.
    Assistant,
}

impl MessageRole {
    /// Wire representation of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in a chat session.
///
/// Messages are append-only: once a message is in a session's list its
/// content is never rewritten by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (server-assigned, or UUIDv7 for local user turns).
    pub id: String,
    /// Who sent the message.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Mentor that produced the message (assistant messages only).
    pub mentor_id: Option<String>,
    /// XP awarded for this turn. Always zero for user messages.
    pub xp_earned: u32,
}

impl Message {
    /// Synthesize a user message locally, before the server has seen it.
    pub fn local_user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            mentor_id: None,
            xp_earned: 0,
        }
    }

    /// Build an assistant reply from server-provided fields.
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        mentor_id: impl Into<String>,
        xp_earned: u32,
    ) -> Self {
        Self {
            id: id.into(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            mentor_id: Some(mentor_id.into()),
            xp_earned,
        }
    }
}
