//! Stellecta - chat with AI mentors from the terminal.
//!
//! Architecture:
//! - `api` is the REST transport (bearer auth, refresh-on-401) and the
//!   stateless chat/auth services on top of it
//! - `store` owns all chat state and mediates every chat call
//! - `view` renders store state and turns typed lines into store calls
//! - `cli` wires config, client, store and views for each command

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod store;
#[cfg(test)]
mod testing;
pub mod view;
