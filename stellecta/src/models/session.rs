//! Session model representing one conversation thread with a mentor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A session is one continuous conversation with a single mentor.
///
/// Sessions are created by the backend when the first message is sent
/// without a session id; the client only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-assigned session identifier.
    pub id: String,
    /// Mentor this session belongs to.
    pub mentor_id: String,
    /// Subject the conversation is about.
    pub subject: String,
    /// When the first message was sent.
    pub start_time: DateTime<Utc>,
    /// Number of messages exchanged so far.
    pub message_count: u32,
    /// XP earned across the whole session.
    pub total_xp_earned: u32,
    /// Whether the backend still considers the session open.
    pub is_active: bool,
}
