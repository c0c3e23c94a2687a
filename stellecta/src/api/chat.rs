//! Chat service: typed request/response calls, no state.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{ApiClient, ApiError};
use super::wire::{
    MentorsResponse, MessagesResponse, SendMessageRequest, SendMessageResponse, SessionsResponse,
};
use crate::models::{Mentor, Message, Session};

/// The chat operations the store depends on.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send_message(
        &self,
        message: &str,
        session_id: Option<&str>,
        mentor_id: Option<&str>,
    ) -> Result<SendMessageResponse, ApiError>;

    /// Most-recent-first, at most `limit` entries.
    async fn get_sessions(&self, limit: usize) -> Result<Vec<Session>, ApiError>;

    /// Messages of one session in server order.
    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError>;

    async fn get_mentors(&self) -> Result<Vec<Mentor>, ApiError>;
}

/// `ChatService` over the REST API.
#[derive(Debug, Clone)]
pub struct HttpChatService {
    client: Arc<ApiClient>,
}

impl HttpChatService {
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn send_message(
        &self,
        message: &str,
        session_id: Option<&str>,
        mentor_id: Option<&str>,
    ) -> Result<SendMessageResponse, ApiError> {
        let body = SendMessageRequest {
            message,
            session_id,
            mentor_id,
        };
        self.client.post("/chat/message", &body).await
    }

    async fn get_sessions(&self, limit: usize) -> Result<Vec<Session>, ApiError> {
        let response: SessionsResponse = self
            .client
            .get("/chat/sessions", &[("limit", limit.to_string())])
            .await?;
        Ok(response.sessions.into_iter().map(Session::from).collect())
    }

    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        let path = format!(
            "/chat/sessions/{}/messages",
            urlencoding::encode(session_id)
        );
        let response: MessagesResponse = self.client.get(&path, &[]).await?;
        Ok(response.messages.into_iter().map(Message::from).collect())
    }

    async fn get_mentors(&self) -> Result<Vec<Mentor>, ApiError> {
        let response: MentorsResponse = self.client.get("/chat/mentors", &[]).await?;
        Ok(response.mentors.into_iter().map(Mentor::from).collect())
    }
}
