//! Message references.
//!
//! Messages are written by the messaging service. Chats only point at their
//! most recent one, which is expanded with its sender.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// Latest message of a chat, with the sender expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender: User,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
