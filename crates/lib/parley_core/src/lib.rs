//! # parley_core
//!
//! Core domain logic for Parley: chat models, persistence and population.

pub mod chats;
pub mod migrate;
pub mod models;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
