//! The message being composed.
//!
//! A submitted draft is held until the send succeeds; a failed send puts it
//! back so it can be resent without retyping.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    in_flight: Option<String>,
}

impl Draft {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Move the draft into flight. Refuses blank text or a second submit.
    pub fn submit(&mut self) -> Option<String> {
        if self.in_flight.is_some() || self.text.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.in_flight = Some(text.clone());
        Some(text)
    }

    /// The send went through; the draft is gone for good.
    pub fn succeed(&mut self) {
        self.in_flight = None;
    }

    /// The send failed; restore the text unless something new was typed.
    pub fn fail(&mut self) {
        if let Some(text) = self.in_flight.take() {
            if self.text.is_empty() {
                self.text = text;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_drafts_are_not_submitted() {
        let mut draft = Draft::default();
        draft.set("   \n");
        assert_eq!(draft.submit(), None);
        assert!(!draft.is_in_flight());
    }

    #[test]
    fn failed_send_restores_text() {
        let mut draft = Draft::default();
        draft.set("What is photosynthesis?");
        assert_eq!(draft.submit().as_deref(), Some("What is photosynthesis?"));
        assert_eq!(draft.text(), "");

        draft.fail();
        assert_eq!(draft.text(), "What is photosynthesis?");
        assert!(!draft.is_in_flight());
    }

    #[test]
    fn successful_send_discards_text() {
        let mut draft = Draft::default();
        draft.set("hi");
        draft.submit();
        draft.succeed();
        assert_eq!(draft.text(), "");
        draft.fail();
        assert_eq!(draft.text(), "");
    }

    #[test]
    fn only_one_submit_in_flight() {
        let mut draft = Draft::default();
        draft.set("one");
        draft.submit();
        draft.set("two");
        assert_eq!(draft.submit(), None);

        draft.fail();
        assert_eq!(draft.text(), "two");
    }
}
