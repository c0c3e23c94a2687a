//! Interactive chat controller.
//!
//! Turns typed lines into store calls and returns the lines to print. Sends
//! run on their own task so input stays responsive; their results come back
//! through the receiver returned by `ChatInterface::new` and are handed to
//! `finish_send`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use super::draft::Draft;
use super::notify::XpNotifier;
use super::render;
use crate::api::SendMessageResponse;
use crate::store::{ChatState, ChatStore, StoreError};

const HELP: &[&str] = &[
    "Type a message and press Enter to ask your mentor.",
    "  /mentors          choose a mentor",
    "  /mentor <n|id>    switch to a mentor directly",
    "  /sessions         browse previous sessions (/sessions refresh to reload)",
    "  /open <n|id>      open a previous session",
    "  /history          show the current transcript",
    "  /new              start a new chat",
    "  /retry            resend the last message that failed",
    "  /dismiss          hide the error banner",
    "  /xp               show your level and XP",
    "  /quit             leave",
];

/// Result of a send task.
#[derive(Debug)]
pub struct SendFinished(pub Result<SendMessageResponse, StoreError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Chat,
    /// The mentor picker is open; the next line is a choice.
    SelectingMentor,
    /// The session sidebar is open; the next line is a choice.
    BrowsingSessions,
}

/// Lines to print, and whether the user asked to leave.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Output {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }

    fn extend(&mut self, other: Self) {
        self.lines.extend(other.lines);
        self.quit |= other.quit;
    }
}

pub struct ChatInterface {
    store: Arc<ChatStore>,
    session_limit: usize,
    draft: Draft,
    notifier: XpNotifier,
    mode: Mode,
    finished_tx: mpsc::UnboundedSender<SendFinished>,
}

impl ChatInterface {
    pub fn new(
        store: Arc<ChatStore>,
        session_limit: usize,
        xp_window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SendFinished>) {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let interface = Self {
            store,
            session_limit,
            draft: Draft::default(),
            notifier: XpNotifier::new(xp_window),
            mode: Mode::Chat,
            finished_tx,
        };
        (interface, finished_rx)
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Initial screen, optionally resuming a session or preselecting a mentor.
    pub async fn start(&mut self, mentor: Option<&str>, session: Option<&str>) -> Output {
        let _ = self.store.load_mentors().await;

        match (session, mentor) {
            (Some(session_id), Some(mentor_id)) => {
                let _ = self.store.open_session(session_id, mentor_id).await;
            }
            (Some(session_id), None) => {
                self.ensure_sessions(false).await;
                let known = self
                    .store
                    .snapshot()
                    .await
                    .sessions
                    .into_iter()
                    .find(|s| s.id == session_id)
                    .map(|s| s.mentor_id);
                let _ = match known {
                    Some(mentor_id) => self.store.open_session(session_id, &mentor_id).await,
                    None => self.store.load_session_messages(session_id).await,
                };
            }
            (None, Some(mentor_id)) => self.store.select_mentor(mentor_id).await,
            (None, None) => {}
        }

        let state = self.store.snapshot().await;
        let mut lines = vec!["Type /help for commands.".to_string()];
        lines.extend(render::transcript(&state));
        lines.extend(render::error_banner(&state));
        Output::lines(lines)
    }

    /// Prompt reflecting the current mentor and whether a reply is pending.
    pub async fn prompt(&self) -> String {
        let state = self.store.snapshot().await;
        let name = state
            .current_mentor()
            .map(|m| m.name.clone())
            .or(state.current_mentor_id);
        let waiting = if state.is_sending_message { " …" } else { "" };
        match (self.mode, name) {
            (Mode::SelectingMentor, _) => "mentor #> ".to_string(),
            (Mode::BrowsingSessions, _) => "session #> ".to_string(),
            (Mode::Chat, Some(name)) => format!("{name}{waiting}> "),
            (Mode::Chat, None) => format!("{waiting}> "),
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> Output {
        let input = line.trim();
        if self.mode != Mode::Chat && input.starts_with('/') && input != "/cancel" {
            // Any other command closes the picker and runs as usual.
            self.mode = Mode::Chat;
        }
        match self.mode {
            Mode::SelectingMentor => return self.choose_mentor(input).await,
            Mode::BrowsingSessions => return self.choose_session(input).await,
            Mode::Chat => {}
        }

        if input.is_empty() {
            return Output::default();
        }
        if let Some(command) = input.strip_prefix('/') {
            return self.command(command).await;
        }

        if self.draft.is_in_flight() || self.store.snapshot().await.is_sending_message {
            return Output::line("Still waiting for your mentor's reply...");
        }
        self.draft.set(line);
        self.send_draft().await
    }

    /// Apply the result of a send task.
    pub async fn finish_send(&mut self, finished: SendFinished) -> Output {
        let state = self.store.snapshot().await;
        match finished.0 {
            Ok(reply) => {
                self.draft.succeed();
                let mut lines: Vec<String> = state
                    .messages
                    .iter()
                    .filter(|m| m.id == reply.message_id)
                    .map(|m| render::message(m, &state))
                    .collect();
                lines.extend(
                    self.notifier
                        .observe(&state.progress, Instant::now())
                        .into_iter()
                        .map(|notice| notice.to_string()),
                );
                Output::lines(lines)
            }
            Err(StoreError::Stale) => {
                self.draft.succeed();
                debug!("stale reply ignored by interface");
                Output::default()
            }
            Err(_) => {
                self.draft.fail();
                let mut lines: Vec<String> = render::error_banner(&state).into_iter().collect();
                lines.push("Your message was kept; type /retry to send it again.".to_string());
                Output::lines(lines)
            }
        }
    }

    async fn command(&mut self, command: &str) -> Output {
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, arg)| (name, arg.trim()));

        match name {
            "help" | "h" | "?" => Output::lines(HELP.iter().map(ToString::to_string).collect()),
            "quit" | "exit" | "q" => Output {
                lines: vec!["Bye!".to_string()],
                quit: true,
            },
            "mentors" => self.open_mentor_selector().await,
            "mentor" if !arg.is_empty() => {
                let _ = self.store.load_mentors().await;
                self.choose_mentor(arg).await
            }
            "sessions" => self.open_session_sidebar(arg == "refresh").await,
            "open" if !arg.is_empty() => {
                self.ensure_sessions(false).await;
                self.choose_session(arg).await
            }
            "history" => {
                let state = self.store.snapshot().await;
                Output::lines(render::transcript(&state))
            }
            "new" => {
                self.store.clear_messages().await;
                Output::line("Started a new chat. Pick a mentor with /mentors.")
            }
            "retry" => {
                if self.draft.text().trim().is_empty() {
                    Output::line("Nothing to retry.")
                } else {
                    self.send_draft().await
                }
            }
            "dismiss" => {
                self.store.clear_error().await;
                Output::default()
            }
            "xp" => {
                let state = self.store.snapshot().await;
                let mut lines = vec![render::progress(&state.progress)];
                if let Some(xp) = self.notifier.active(Instant::now()) {
                    lines.push(format!("Just earned +{xp} XP"));
                }
                Output::lines(lines)
            }
            _ => Output::line(format!("Unknown command /{command}. Type /help.")),
        }
    }

    /// Hand the draft to a send task, or open the mentor picker if none is chosen.
    async fn send_draft(&mut self) -> Output {
        let state = self.store.snapshot().await;
        if self.draft.is_in_flight() || state.is_sending_message {
            return Output::line("Still waiting for your mentor's reply...");
        }
        if state.current_mentor_id.is_none() {
            let mut output = Output::line("Pick a mentor first; your message will be sent once you choose.");
            output.extend(self.open_mentor_selector().await);
            return output;
        }

        let Some(text) = self.draft.submit() else {
            return Output::default();
        };
        let store = self.store.clone();
        let finished_tx = self.finished_tx.clone();
        tokio::spawn(async move {
            let result = store.send_message(&text, None).await;
            let _ = finished_tx.send(SendFinished(result));
        });
        Output::default()
    }

    async fn open_mentor_selector(&mut self) -> Output {
        let _ = self.store.load_mentors().await;
        let state = self.store.snapshot().await;
        self.mode = if state.mentors.is_empty() {
            Mode::Chat
        } else {
            Mode::SelectingMentor
        };
        with_banner(render::mentor_list(&state), &state)
    }

    async fn choose_mentor(&mut self, input: &str) -> Output {
        if input == "/cancel" {
            self.mode = Mode::Chat;
            return Output::line("Cancelled.");
        }

        let state = self.store.snapshot().await;
        let Some(mentor) = pick(&state.mentors, input, |m| m.id.as_str()) else {
            return Output::line(format!("No mentor matches '{input}'."));
        };

        self.store.select_mentor(&mentor.id).await;
        self.mode = Mode::Chat;
        let mut output = Output::line(format!(
            "{} {} ({}) is your mentor.",
            mentor.icon, mentor.name, mentor.subject
        ));
        if !self.draft.text().trim().is_empty() && !self.draft.is_in_flight() {
            output.extend(self.send_draft().await);
        }
        output
    }

    /// Load sessions if the list is empty and idle, or unconditionally when forced.
    async fn ensure_sessions(&self, force: bool) {
        let state = self.store.snapshot().await;
        if force || (state.sessions.is_empty() && !state.is_loading_sessions) {
            let _ = self.store.load_sessions(self.session_limit).await;
        }
    }

    async fn open_session_sidebar(&mut self, force: bool) -> Output {
        self.ensure_sessions(force).await;
        let _ = self.store.load_mentors().await;
        let state = self.store.snapshot().await;
        self.mode = if state.sessions.is_empty() {
            Mode::Chat
        } else {
            Mode::BrowsingSessions
        };
        with_banner(render::session_list(&state), &state)
    }

    async fn choose_session(&mut self, input: &str) -> Output {
        if input == "/cancel" {
            self.mode = Mode::Chat;
            return Output::line("Cancelled.");
        }

        let state = self.store.snapshot().await;
        let Some(session) = pick(&state.sessions, input, |s| s.id.as_str()) else {
            return Output::line(format!("No session matches '{input}'."));
        };

        self.mode = Mode::Chat;
        let _ = self
            .store
            .open_session(&session.id, &session.mentor_id)
            .await;
        let state = self.store.snapshot().await;
        with_banner(render::transcript(&state), &state)
    }
}

fn with_banner(mut lines: Vec<String>, state: &ChatState) -> Output {
    lines.extend(render::error_banner(state));
    Output::lines(lines)
}

/// Find an item by 1-based position or by id.
fn pick<'a, T>(items: &'a [T], input: &str, id: impl Fn(&T) -> &str) -> Option<&'a T> {
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| items.get(i));
    }
    items.iter().find(|item| id(item).eq_ignore_ascii_case(input))
}
