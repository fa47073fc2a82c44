//! Domain models.
//!
//! Internal shapes returned by `parley_core` queries. The HTTP layer maps them
//! onto its own camelCase wire models.

pub mod chat;
pub mod message;
pub mod user;

pub use chat::Chat;
pub use message::MessageSummary;
pub use user::User;
