//! Data models for chat entities.

mod mentor;
mod message;
mod progress;
mod session;

pub use mentor::{Mentor, MentorStyle};
pub use message::{Message, MessageRole};
pub use progress::Progress;
pub use session::Session;
