//! Chat domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{MessageSummary, User};

/// A chat with its member, admin and latest-message references expanded.
///
/// A direct chat (`is_group_chat == false`) has exactly two members and no
/// admin. A group chat has a name and an admin who is also a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub chat_name: String,
    pub is_group_chat: bool,
    pub users: Vec<User>,
    pub group_admin: Option<User>,
    pub latest_message: Option<MessageSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Whether `user_id` is one of the chat's members.
    pub fn has_member(&self, user_id: &Uuid) -> bool {
        self.users.iter().any(|u| &u.id == user_id)
    }
}
