//! JSON shapes exchanged with the backend.
//!
//! These mirror the API exactly; conversion into the domain models happens
//! in the services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Mentor, Message, MessageRole, Session};

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<&'a str>,
}

/// Reply to a sent message, carrying the mentor's answer and updated XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub session_id: String,
    pub mentor_id: String,
    pub message_id: String,
    pub text: String,
    #[serde(default)]
    pub xp_earned: u32,
    #[serde(default)]
    pub total_xp: u32,
    #[serde(default)]
    pub current_level: u32,
}

#[derive(Debug, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionDto>,
}

#[derive(Debug, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub mentor_id: String,
    #[serde(default)]
    pub subject: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub total_xp_earned: u32,
    #[serde(default)]
    pub is_active: bool,
}

impl From<SessionDto> for Session {
    fn from(dto: SessionDto) -> Self {
        Self {
            id: dto.id,
            mentor_id: dto.mentor_id,
            subject: dto.subject,
            start_time: dto.start_time,
            message_count: dto.message_count,
            total_xp_earned: dto.total_xp_earned,
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageDto>,
}

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub mentor_id: Option<String>,
    #[serde(default)]
    pub xp_earned: u32,
}

impl From<MessageDto> for Message {
    fn from(dto: MessageDto) -> Self {
        Self {
            id: dto.id,
            role: dto.role,
            content: dto.content,
            timestamp: dto.timestamp,
            mentor_id: dto.mentor_id,
            xp_earned: dto.xp_earned,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MentorsResponse {
    pub mentors: Vec<MentorDto>,
}

#[derive(Debug, Deserialize)]
pub struct MentorDto {
    pub agent_id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
}

impl From<MentorDto> for Mentor {
    fn from(dto: MentorDto) -> Self {
        Self::new(dto.agent_id, dto.name, dto.subject)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

/// The signed-in account, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_omits_absent_ids() {
        let body = SendMessageRequest {
            message: "What is 2+2?",
            session_id: None,
            mentor_id: Some("stella"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"message": "What is 2+2?", "mentor_id": "stella"}));
    }

    #[test]
    fn mentor_dto_maps_agent_id() {
        let dto: MentorDto =
            serde_json::from_str(r#"{"agent_id":"nova","name":"Nova","subject":"Chemistry"}"#)
                .unwrap();
        let mentor = Mentor::from(dto);
        assert_eq!(mentor.id, "nova");
        assert_eq!(mentor.subject, "Chemistry");
    }

    #[test]
    fn session_dto_tolerates_missing_counters() {
        let dto: SessionDto = serde_json::from_str(
            r#"{"id":"s1","mentor_id":"stella","start_time":"2026-01-05T10:00:00Z"}"#,
        )
        .unwrap();
        let session = Session::from(dto);
        assert_eq!(session.message_count, 0);
        assert!(!session.is_active);
    }
}
