//! XP and level-up feedback.
//!
//! The notifier keeps the last level it has seen outside the store, so a
//! level-up is detected as a transition between two observed replies.

use std::time::{Duration, Instant};

use crate::models::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    XpEarned(u32),
    LevelUp { from: u32, to: u32 },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XpEarned(xp) => write!(f, "✨ +{xp} XP"),
            Self::LevelUp { from, to } => write!(f, "🎉 Level up! {from} → {to}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XpNotifier {
    window: Duration,
    previous_level: Option<u32>,
    visible: Option<(u32, Instant)>,
}

impl XpNotifier {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            previous_level: None,
            visible: None,
        }
    }

    /// Record the counters after a reply and return what to announce.
    pub fn observe(&mut self, progress: &Progress, now: Instant) -> Vec<Notice> {
        let mut notices = Vec::new();

        if progress.last_xp_earned > 0 {
            self.visible = Some((progress.last_xp_earned, now + self.window));
            notices.push(Notice::XpEarned(progress.last_xp_earned));
        }

        if let Some(from) = self.previous_level {
            if progress.current_level > from {
                notices.push(Notice::LevelUp {
                    from,
                    to: progress.current_level,
                });
            }
        }
        self.previous_level = Some(progress.current_level);

        notices
    }

    /// XP notification still on screen at `now`, if any.
    pub fn active(&self, now: Instant) -> Option<u32> {
        self.visible
            .filter(|(_, until)| now < *until)
            .map(|(xp, _)| xp)
    }
}
