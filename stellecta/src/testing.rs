//! Scripted `ChatService` for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;

use crate::api::{ApiError, ChatService, SendMessageResponse};
use crate::models::{Mentor, Message, Session};

/// One queued response, optionally held until the test releases it.
struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, ApiError>,
}

/// Arguments of one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCall {
    pub message: String,
    pub session_id: Option<String>,
    pub mentor_id: Option<String>,
}

#[derive(Default)]
pub struct MockChatService {
    sends: Mutex<VecDeque<Scripted<SendMessageResponse>>>,
    sessions: Mutex<VecDeque<Result<Vec<Session>, ApiError>>>,
    messages: Mutex<VecDeque<Result<Vec<Message>, ApiError>>>,
    mentors: Mutex<VecDeque<Scripted<Vec<Mentor>>>>,
    send_calls: Mutex<Vec<SendCall>>,
    session_limits: Mutex<Vec<usize>>,
    message_calls: Mutex<Vec<String>>,
    mentor_calls: AtomicUsize,
}

impl MockChatService {
    pub fn push_send(&self, result: Result<SendMessageResponse, ApiError>) {
        self.sends.lock().unwrap().push_back(Scripted { gate: None, result });
    }

    /// Queue a send reply that is only delivered once the returned sender fires.
    pub fn push_gated_send(
        &self,
        result: Result<SendMessageResponse, ApiError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.sends.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub fn push_sessions(&self, result: Result<Vec<Session>, ApiError>) {
        self.sessions.lock().unwrap().push_back(result);
    }

    pub fn push_messages(&self, result: Result<Vec<Message>, ApiError>) {
        self.messages.lock().unwrap().push_back(result);
    }

    pub fn push_mentors(&self, result: Result<Vec<Mentor>, ApiError>) {
        self.mentors.lock().unwrap().push_back(Scripted { gate: None, result });
    }

    pub fn push_gated_mentors(&self, result: Result<Vec<Mentor>, ApiError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.mentors.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub fn send_calls(&self) -> Vec<SendCall> {
        self.send_calls.lock().unwrap().clone()
    }

    pub fn session_limits(&self) -> Vec<usize> {
        self.session_limits.lock().unwrap().clone()
    }

    pub fn message_calls(&self) -> Vec<String> {
        self.message_calls.lock().unwrap().clone()
    }

    pub fn mentor_calls(&self) -> usize {
        self.mentor_calls.load(Ordering::SeqCst)
    }
}

fn unscripted<T>() -> Result<T, ApiError> {
    Err(ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: Some("no scripted response".into()),
    })
}

async fn deliver<T>(scripted: Option<Scripted<T>>) -> Result<T, ApiError> {
    let Some(Scripted { gate, result }) = scripted else {
        return unscripted();
    };
    if let Some(gate) = gate {
        let _ = gate.await;
    }
    result
}

#[async_trait]
impl ChatService for MockChatService {
    async fn send_message(
        &self,
        message: &str,
        session_id: Option<&str>,
        mentor_id: Option<&str>,
    ) -> Result<SendMessageResponse, ApiError> {
        self.send_calls.lock().unwrap().push(SendCall {
            message: message.to_string(),
            session_id: session_id.map(String::from),
            mentor_id: mentor_id.map(String::from),
        });
        let next = self.sends.lock().unwrap().pop_front();
        deliver(next).await
    }

    async fn get_sessions(&self, limit: usize) -> Result<Vec<Session>, ApiError> {
        self.session_limits.lock().unwrap().push(limit);
        let next = self.sessions.lock().unwrap().pop_front();
        next.unwrap_or_else(unscripted)
    }

    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        self.message_calls.lock().unwrap().push(session_id.to_string());
        let next = self.messages.lock().unwrap().pop_front();
        next.unwrap_or_else(unscripted)
    }

    async fn get_mentors(&self) -> Result<Vec<Mentor>, ApiError> {
        self.mentor_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.mentors.lock().unwrap().pop_front();
        deliver(next).await
    }
}

/// Build a send reply.
pub fn reply(
    session_id: &str,
    mentor_id: &str,
    message_id: &str,
    text: &str,
    xp_earned: u32,
    total_xp: u32,
    current_level: u32,
) -> SendMessageResponse {
    SendMessageResponse {
        session_id: session_id.into(),
        mentor_id: mentor_id.into(),
        message_id: message_id.into(),
        text: text.into(),
        xp_earned,
        total_xp,
        current_level,
    }
}
