//! Gamification counters for the signed-in student.

use serde::{Deserialize, Serialize};

/// XP and level counters, scoped to the user rather than a session.
///
/// Levels are computed by the backend; the client only displays them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Lifetime XP. Never decreases on the client.
    pub total_xp: u32,
    /// Current level as reported by the backend.
    pub current_level: u32,
    /// XP earned by the most recent send; zero while a send is in flight.
    pub last_xp_earned: u32,
}

impl Progress {
    /// Apply counters from a send response.
    ///
    /// The level is always the backend's. A total lower than the one already
    /// held is ignored so the displayed XP stays monotonic.
    pub fn apply(&mut self, xp_earned: u32, total_xp: u32, current_level: u32) {
        self.last_xp_earned = xp_earned;
        self.total_xp = self.total_xp.max(total_xp);
        self.current_level = current_level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sets_all_counters() {
        let mut progress = Progress::default();
        progress.apply(15, 115, 2);
        assert_eq!(progress.last_xp_earned, 15);
        assert_eq!(progress.total_xp, 115);
        assert_eq!(progress.current_level, 2);
    }

    #[test]
    fn total_xp_never_decreases() {
        let mut progress = Progress::default();
        progress.apply(10, 200, 3);
        progress.apply(5, 150, 2);
        assert_eq!(progress.total_xp, 200);
        assert_eq!(progress.last_xp_earned, 5);
    }

    #[test]
    fn level_follows_backend_even_when_total_is_ignored() {
        let mut progress = Progress::default();
        progress.apply(10, 200, 3);
        progress.apply(5, 150, 4);
        assert_eq!(progress.total_xp, 200);
        assert_eq!(progress.current_level, 4);
    }
}
