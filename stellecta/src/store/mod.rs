//! Client-side chat state.

mod chat;

pub use chat::{ChatState, ChatStore, StoreError};
