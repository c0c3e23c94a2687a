//! Client for the Stellecta REST API.

mod auth;
mod chat;
mod client;
mod tokens;
mod wire;

pub use auth::AuthService;
pub use chat::{ChatService, HttpChatService};
pub use client::{ApiClient, ApiError};
pub use tokens::{TokenStore, Tokens};
pub use wire::{SendMessageResponse, User};
