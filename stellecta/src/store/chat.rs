//! The chat store: single owner of conversation state.
//!
//! All mutation goes through `ChatStore` methods. Network failures never
//! escape as panics; each operation records a display string in
//! `ChatState::error`, clears its loading flag, and returns an `Err` the
//! caller can branch on.
//!
//! Sends are numbered. A reply is applied only if no later send has been
//! applied already, so overlapping sends cannot reorder the transcript.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::api::{ApiError, ChatService, SendMessageResponse};
use crate::models::{Mentor, Message, Progress, Session};

const SEND_FAILED: &str = "Failed to send message";
const LOAD_MESSAGES_FAILED: &str = "Failed to load messages";
const LOAD_SESSIONS_FAILED: &str = "Failed to load sessions";
const LOAD_MENTORS_FAILED: &str = "Failed to load mentors";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Choose a mentor before sending a message")]
    MissingMentor,

    /// A later send was applied first; this reply was dropped.
    #[error("Reply arrived after a newer one and was discarded")]
    Stale,

    #[error("{0}")]
    Request(String),
}

/// Everything the chat views render from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub current_session_id: Option<String>,
    pub current_mentor_id: Option<String>,
    /// Transcript of the current session, oldest first.
    pub messages: Vec<Message>,
    /// Recent sessions, most recent first.
    pub sessions: Vec<Session>,
    pub mentors: Vec<Mentor>,
    pub is_sending_message: bool,
    pub is_loading_messages: bool,
    pub is_loading_sessions: bool,
    pub is_loading_mentors: bool,
    /// Last failure, as shown to the user.
    pub error: Option<String>,
    pub progress: Progress,
}

impl ChatState {
    pub fn mentor(&self, id: &str) -> Option<&Mentor> {
        self.mentors.iter().find(|m| m.id == id)
    }

    pub fn current_mentor(&self) -> Option<&Mentor> {
        self.current_mentor_id.as_deref().and_then(|id| self.mentor(id))
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: ChatState,
    in_flight_sends: usize,
    next_send_seq: u64,
    /// Sequence number of the newest send whose reply was applied, or the
    /// cut-off below which replies belong to an abandoned conversation.
    applied_seq: u64,
}

impl Inner {
    /// Drop any reply still in flight for the conversation being left.
    fn abandon_in_flight(&mut self) {
        self.applied_seq = self.next_send_seq;
    }
}

/// Owner of the chat state, shared by `Arc` between views.
pub struct ChatStore {
    service: Arc<dyn ChatService>,
    inner: RwLock<Inner>,
    changes: watch::Sender<u64>,
}

impl ChatStore {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        let (changes, _rx) = watch::channel(0);
        Self {
            service,
            inner: RwLock::new(Inner::default()),
            changes,
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> ChatState {
        self.inner.read().await.state.clone()
    }

    /// Receiver that ticks after every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Stream of change ticks, for views that re-render on every update.
    pub fn changes(&self) -> WatchStream<u64> {
        WatchStream::new(self.subscribe())
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    /// Return to the initial empty state. Replies still in flight are dropped.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.abandon_in_flight();
            inner.state = ChatState {
                is_sending_message: inner.in_flight_sends > 0,
                ..ChatState::default()
            };
        }
        self.notify();
    }

    /// Send `text` to a mentor and append the exchange to the transcript.
    ///
    /// The mentor is `mentor_id` if given, else the current one. With neither
    /// the call fails with `MissingMentor` before any request is made.
    pub async fn send_message(
        &self,
        text: &str,
        mentor_id: Option<&str>,
    ) -> Result<SendMessageResponse, StoreError> {
        let prepared = {
            let mut inner = self.inner.write().await;
            let mentor = mentor_id
                .map(str::to_owned)
                .or_else(|| inner.state.current_mentor_id.clone());
            match mentor {
                None => {
                    inner.state.error = Some(StoreError::MissingMentor.to_string());
                    None
                }
                Some(mentor) => {
                    inner.next_send_seq += 1;
                    inner.in_flight_sends += 1;
                    inner.state.is_sending_message = true;
                    inner.state.progress.last_xp_earned = 0;
                    Some((
                        inner.next_send_seq,
                        inner.state.current_session_id.clone(),
                        mentor,
                    ))
                }
            }
        };
        self.notify();
        let Some((seq, session_id, mentor)) = prepared else {
            return Err(StoreError::MissingMentor);
        };

        debug!(seq, session = session_id.as_deref().unwrap_or("-"), %mentor, "sending message");
        let result = self
            .service
            .send_message(text, session_id.as_deref(), Some(&mentor))
            .await;

        let outcome = {
            let mut inner = self.inner.write().await;
            inner.in_flight_sends = inner.in_flight_sends.saturating_sub(1);
            inner.state.is_sending_message = inner.in_flight_sends > 0;

            match result {
                _ if seq <= inner.applied_seq => {
                    warn!(seq, applied = inner.applied_seq, "discarding stale reply");
                    Err(StoreError::Stale)
                }
                Ok(reply) => {
                    inner.applied_seq = seq;
                    apply_reply(&mut inner.state, text, &reply);
                    Ok(reply)
                }
                Err(err) => {
                    let message = describe(&err, SEND_FAILED);
                    warn!(seq, error = %err, "send failed");
                    inner.state.error = Some(message.clone());
                    Err(StoreError::Request(message))
                }
            }
        };
        self.notify();
        outcome
    }

    /// Replace the transcript with a session's history and make it current.
    ///
    /// The current mentor is left alone; see `open_session` for the paired form.
    pub async fn load_session_messages(&self, session_id: &str) -> Result<(), StoreError> {
        self.inner.write().await.state.is_loading_messages = true;
        self.notify();

        let result = self.service.get_session_messages(session_id).await;

        let outcome = {
            let mut inner = self.inner.write().await;
            inner.state.is_loading_messages = false;
            match result {
                Ok(messages) => {
                    inner.abandon_in_flight();
                    inner.state.messages = messages;
                    inner.state.current_session_id = Some(session_id.to_string());
                    Ok(())
                }
                Err(err) => Err(record_failure(&mut inner.state, &err, LOAD_MESSAGES_FAILED)),
            }
        };
        self.notify();
        outcome
    }

    /// Make a session and its mentor current, then load its history.
    pub async fn open_session(&self, session_id: &str, mentor_id: &str) -> Result<(), StoreError> {
        self.set_current_session(session_id, mentor_id).await;
        self.load_session_messages(session_id).await
    }

    /// Refresh the session list wholesale.
    pub async fn load_sessions(&self, limit: usize) -> Result<(), StoreError> {
        self.inner.write().await.state.is_loading_sessions = true;
        self.notify();

        let result = self.service.get_sessions(limit).await;

        let outcome = {
            let mut inner = self.inner.write().await;
            inner.state.is_loading_sessions = false;
            match result {
                Ok(mut sessions) => {
                    sessions.truncate(limit);
                    inner.state.sessions = sessions;
                    Ok(())
                }
                Err(err) => Err(record_failure(&mut inner.state, &err, LOAD_SESSIONS_FAILED)),
            }
        };
        self.notify();
        outcome
    }

    /// Fetch the mentor roster unless it is cached or already loading.
    pub async fn load_mentors(&self) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            if !inner.state.mentors.is_empty() || inner.state.is_loading_mentors {
                return Ok(());
            }
            inner.state.is_loading_mentors = true;
        }
        self.notify();

        let result = self.service.get_mentors().await;

        let outcome = {
            let mut inner = self.inner.write().await;
            inner.state.is_loading_mentors = false;
            match result {
                Ok(mentors) => {
                    inner.state.mentors = mentors;
                    Ok(())
                }
                Err(err) => Err(record_failure(&mut inner.state, &err, LOAD_MENTORS_FAILED)),
            }
        };
        self.notify();
        outcome
    }

    /// Point the store at a session and mentor without touching the network.
    pub async fn set_current_session(&self, session_id: &str, mentor_id: &str) {
        {
            let mut inner = self.inner.write().await;
            if inner.state.current_session_id.as_deref() != Some(session_id) {
                inner.abandon_in_flight();
            }
            inner.state.current_session_id = Some(session_id.to_string());
            inner.state.current_mentor_id = Some(mentor_id.to_string());
        }
        self.notify();
    }

    /// Choose the mentor for the next message.
    ///
    /// Switching to a different mentor starts a fresh conversation.
    pub async fn select_mentor(&self, mentor_id: &str) {
        {
            let mut inner = self.inner.write().await;
            if inner.state.current_mentor_id.as_deref() == Some(mentor_id) {
                return;
            }
            inner.abandon_in_flight();
            inner.state.messages.clear();
            inner.state.current_session_id = None;
            inner.state.current_mentor_id = Some(mentor_id.to_string());
        }
        self.notify();
    }

    /// Start a new chat: empty transcript, no session, no mentor.
    pub async fn clear_messages(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.abandon_in_flight();
            inner.state.messages.clear();
            inner.state.current_session_id = None;
            inner.state.current_mentor_id = None;
        }
        self.notify();
    }

    pub async fn clear_error(&self) {
        self.inner.write().await.state.error = None;
        self.notify();
    }
}

fn apply_reply(state: &mut ChatState, text: &str, reply: &SendMessageResponse) {
    if state.current_session_id.is_none() {
        state.current_session_id = Some(reply.session_id.clone());
    }
    if state.current_mentor_id.is_none() {
        state.current_mentor_id = Some(reply.mentor_id.clone());
    }
    state.messages.push(Message::local_user(text));
    state.messages.push(Message::assistant(
        &reply.message_id,
        &reply.text,
        &reply.mentor_id,
        reply.xp_earned,
    ));
    state
        .progress
        .apply(reply.xp_earned, reply.total_xp, reply.current_level);
}

fn record_failure(state: &mut ChatState, err: &ApiError, fallback: &str) -> StoreError {
    warn!(error = %err, "{fallback}");
    let message = describe(err, fallback);
    state.error = Some(message.clone());
    StoreError::Request(message)
}

fn describe(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::SessionExpired => err.to_string(),
        _ => err.detail().unwrap_or(fallback).to_string(),
    }
}
