//! Chat access and group management.
//!
//! Direct chats are found-or-created per member pair; group chats are created,
//! renamed and have their membership changed. Every query returns fully
//! populated [`Chat`](crate::models::Chat) values.

mod populate;
pub mod queries;

use thiserror::Error;

pub use queries::{
    access_direct_chat, add_member, create_group_chat, find_direct_chat, list_chats,
    remove_member, rename_chat,
};

/// Members a group needs besides its admin.
pub const MIN_GROUP_MEMBERS: usize = 2;

/// Chat operation errors.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),

    #[error("Chat Not Found")]
    ChatNotFound,

    #[error("User Not Found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

impl ChatError {
    /// Maps foreign-key violations on member references to `UserNotFound`.
    pub(crate) fn from_member_write(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => ChatError::UserNotFound,
            _ => ChatError::DbError(e),
        }
    }
}
