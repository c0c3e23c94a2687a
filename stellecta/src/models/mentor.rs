//! Mentor catalog: the fixed set of AI personas a student can talk to.

use serde::{Deserialize, Serialize};

/// Display metadata the client attaches to a mentor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentorStyle {
    pub icon: &'static str,
    /// Gradient as a `from -> to` colour pair.
    pub gradient: (&'static str, &'static str),
}

const FALLBACK_STYLE: MentorStyle = MentorStyle {
    icon: "🤖",
    gradient: ("#64748b", "#334155"),
};

/// Known mentors and their presentation. The backend owns names and subjects.
const CATALOG: &[(&str, MentorStyle)] = &[
    ("stella", MentorStyle { icon: "⭐", gradient: ("#f59e0b", "#ef4444") }),
    ("max", MentorStyle { icon: "⚛️", gradient: ("#3b82f6", "#6366f1") }),
    ("nova", MentorStyle { icon: "🧪", gradient: ("#10b981", "#14b8a6") }),
    ("darwin", MentorStyle { icon: "🧬", gradient: ("#22c55e", "#84cc16") }),
    ("lexi", MentorStyle { icon: "📚", gradient: ("#ec4899", "#f43f5e") }),
    ("neo", MentorStyle { icon: "💻", gradient: ("#8b5cf6", "#6366f1") }),
    ("atlas", MentorStyle { icon: "🏛️", gradient: ("#d97706", "#92400e") }),
    ("echo", MentorStyle { icon: "🌍", gradient: ("#06b6d4", "#0ea5e9") }),
];

/// A mentor persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentor {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub icon: String,
    pub gradient: (String, String),
}

impl Mentor {
    /// Build a mentor from backend fields, decorating it from the catalog.
    pub fn new(id: impl Into<String>, name: impl Into<String>, subject: impl Into<String>) -> Self {
        let id = id.into();
        let style = Self::style_for(&id);
        Self {
            id,
            name: name.into(),
            subject: subject.into(),
            icon: style.icon.to_string(),
            gradient: (style.gradient.0.to_string(), style.gradient.1.to_string()),
        }
    }

    /// Look up presentation for a mentor id; unknown ids get a neutral style.
    pub fn style_for(id: &str) -> MentorStyle {
        CATALOG
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(id))
            .map_or(FALLBACK_STYLE, |(_, style)| *style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_mentors() {
        assert_eq!(CATALOG.len(), 8);
    }

    #[test]
    fn known_mentor_gets_catalog_style() {
        let mentor = Mentor::new("stella", "Stella", "Mathematics");
        assert_eq!(mentor.icon, "⭐");
        assert_eq!(mentor.gradient.0, "#f59e0b");
    }

    #[test]
    fn unknown_mentor_falls_back() {
        let mentor = Mentor::new("mystery", "Mystery", "Unknown");
        assert_eq!(mentor.icon, FALLBACK_STYLE.icon);
    }
}
