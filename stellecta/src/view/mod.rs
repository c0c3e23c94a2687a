//! Terminal views over the chat store.

mod draft;
mod interface;
mod notify;
pub mod render;

pub use draft::Draft;
pub use interface::{ChatInterface, Mode, Output, SendFinished};
pub use notify::{Notice, XpNotifier};
