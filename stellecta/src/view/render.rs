//! Plain-text rendering of chat state.
//!
//! Every function here is pure so the terminal driver only has to print.

use chrono::Local;

use crate::models::{Mentor, Message, MessageRole, Progress, Session};
use crate::store::ChatState;

/// One transcript line block, e.g. `[Stella 14:02] +10 XP` followed by the text.
pub fn message(msg: &Message, state: &ChatState) -> String {
    let time = msg.timestamp.with_timezone(&Local).format("%H:%M");
    let speaker = match msg.role {
        MessageRole::User => "You".to_string(),
        MessageRole::Assistant => msg
            .mentor_id
            .as_deref()
            .map_or_else(|| "Mentor".to_string(), |id| mentor_name(state, id)),
    };
    let xp = if msg.xp_earned > 0 {
        format!(" +{} XP", msg.xp_earned)
    } else {
        String::new()
    };
    format!("[{speaker} {time}]{xp}\n{}", msg.content)
}

pub fn transcript(state: &ChatState) -> Vec<String> {
    if state.messages.is_empty() {
        let hint = state.current_mentor().map_or_else(
            || "No messages yet. Pick a mentor with /mentors to start.".to_string(),
            |m| format!("{} {} is ready. Ask anything about {}.", m.icon, m.name, m.subject),
        );
        return vec![hint];
    }
    state.messages.iter().map(|m| message(m, state)).collect()
}

/// Dismissible banner for the last error, if any.
pub fn error_banner(state: &ChatState) -> Option<String> {
    state
        .error
        .as_deref()
        .map(|err| format!("! {err} (type /dismiss to hide)"))
}

pub fn mentor_list(state: &ChatState) -> Vec<String> {
    if state.mentors.is_empty() {
        let line = if state.is_loading_mentors {
            "Loading mentors..."
        } else {
            "No mentors available."
        };
        return vec![line.to_string()];
    }

    let mut lines = vec!["Choose your mentor:".to_string()];
    for (i, mentor) in state.mentors.iter().enumerate() {
        let marker = if state.current_mentor_id.as_deref() == Some(mentor.id.as_str()) {
            "*"
        } else {
            " "
        };
        lines.push(format!(
            "{marker}{:>2}. {} {:<12} {}",
            i + 1,
            mentor.icon,
            mentor.name,
            mentor.subject
        ));
    }
    lines.push("Enter a number or mentor id (/cancel to go back).".to_string());
    lines
}

pub fn session_list(state: &ChatState) -> Vec<String> {
    if state.sessions.is_empty() {
        let line = if state.is_loading_sessions {
            "Loading sessions..."
        } else {
            "No previous sessions."
        };
        return vec![line.to_string()];
    }

    let mut lines = vec![format!(
        "{:>3}  {:<14} {:<16} {:>5} {:>6}  {}",
        "#", "MENTOR", "SUBJECT", "MSGS", "XP", "STARTED"
    )];
    lines.push("-".repeat(64));
    for (i, session) in state.sessions.iter().enumerate() {
        lines.push(session_row(i + 1, session, state));
    }
    lines.push("Enter a number or session id to open it (/cancel to go back).".to_string());
    lines
}

fn session_row(index: usize, session: &Session, state: &ChatState) -> String {
    let active = if session.is_active { " (active)" } else { "" };
    let current = if state.current_session_id.as_deref() == Some(session.id.as_str()) {
        "*"
    } else {
        " "
    };
    format!(
        "{current}{index:>2}  {:<14} {:<16} {:>5} {:>6}  {}{active}",
        truncate(&mentor_name(state, &session.mentor_id), 14),
        truncate(&session.subject, 16),
        session.message_count,
        session.total_xp_earned,
        session
            .start_time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M"),
    )
}

pub fn progress(progress: &Progress) -> String {
    format!(
        "Level {} · {} XP total",
        progress.current_level, progress.total_xp
    )
}

fn mentor_name(state: &ChatState, id: &str) -> String {
    state
        .mentor(id)
        .map_or_else(|| id.to_string(), |m: &Mentor| m.name.clone())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn state_with_mentors() -> ChatState {
        ChatState {
            mentors: vec![
                Mentor::new("stella", "Stella", "Mathematics"),
                Mentor::new("max", "Max", "Physics"),
            ],
            current_mentor_id: Some("max".into()),
            ..ChatState::default()
        }
    }

    #[test]
    fn assistant_message_shows_mentor_name_and_xp() {
        let state = state_with_mentors();
        let msg = Message::assistant("m1", "Force equals mass times acceleration.", "max", 12);
        let text = message(&msg, &state);
        assert!(text.starts_with("[Max "));
        assert!(text.contains("+12 XP"));
        assert!(text.ends_with("Force equals mass times acceleration."));
    }

    #[test]
    fn user_message_has_no_xp() {
        let text = message(&Message::local_user("why?"), &ChatState::default());
        assert!(text.starts_with("[You "));
        assert!(!text.contains("XP"));
    }

    #[test]
    fn empty_transcript_hints_at_mentor() {
        let lines = transcript(&state_with_mentors());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Max is ready"));

        let lines = transcript(&ChatState::default());
        assert!(lines[0].contains("/mentors"));
    }

    #[test]
    fn mentor_list_marks_current() {
        let lines = mentor_list(&state_with_mentors());
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("  1."));
        assert!(lines[2].starts_with("* 2."));
    }

    #[test]
    fn session_list_rows() {
        let mut state = state_with_mentors();
        state.sessions = vec![Session {
            id: "s1".into(),
            mentor_id: "stella".into(),
            subject: "Fractions and decimals".into(),
            start_time: Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap(),
            message_count: 6,
            total_xp_earned: 45,
            is_active: true,
        }];
        let lines = session_list(&state);
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("Stella"));
        assert!(lines[2].contains("Fractions and d…"));
        assert!(lines[2].contains("45"));
        assert!(lines[2].ends_with("(active)"));
    }

    #[test]
    fn loading_placeholders() {
        let state = ChatState {
            is_loading_mentors: true,
            is_loading_sessions: true,
            ..ChatState::default()
        };
        assert_eq!(mentor_list(&state), ["Loading mentors..."]);
        assert_eq!(session_list(&state), ["Loading sessions..."]);
    }

    #[test]
    fn banner_only_when_error() {
        assert_eq!(error_banner(&ChatState::default()), None);
        let state = ChatState {
            error: Some("Failed to send message".into()),
            ..ChatState::default()
        };
        assert_eq!(
            error_banner(&state).as_deref(),
            Some("! Failed to send message (type /dismiss to hide)")
        );
    }
}
