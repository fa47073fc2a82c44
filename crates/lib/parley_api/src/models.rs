//! Request and response models for the HTTP API (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Diagnostic trace; `null` in production.
    pub stack: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub db_connected: bool,
}

/// Public user fields. Passwords never leave the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub pic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestMessage {
    pub id: Uuid,
    pub sender: UserInfo,
    pub content: String,
    pub chat: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: Uuid,
    pub chat_name: String,
    pub is_group_chat: bool,
    pub users: Vec<UserInfo>,
    pub group_admin: Option<UserInfo>,
    pub latest_message: Option<LatestMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<parley_core::models::User> for UserInfo {
    fn from(u: parley_core::models::User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            pic: u.pic,
        }
    }
}

impl From<parley_core::models::MessageSummary> for LatestMessage {
    fn from(m: parley_core::models::MessageSummary) -> Self {
        Self {
            id: m.id,
            sender: m.sender.into(),
            content: m.content,
            chat: m.chat_id,
            created_at: m.created_at,
        }
    }
}

impl From<parley_core::models::Chat> for ChatResponse {
    fn from(c: parley_core::models::Chat) -> Self {
        Self {
            id: c.id,
            chat_name: c.chat_name,
            is_group_chat: c.is_group_chat,
            users: c.users.into_iter().map(UserInfo::from).collect(),
            group_admin: c.group_admin.map(UserInfo::from),
            latest_message: c.latest_message.map(LatestMessage::from),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------
//
// Fields are optional so that a missing field reaches the handler and gets
// the endpoint's own 400 message instead of a generic rejection.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessChatRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub users: Option<MemberList>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameGroupRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub chat_id: Option<Uuid>,
    pub chat_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub chat_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_id: Option<Uuid>,
}

/// An empty or whitespace id counts as not sent.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Group members as sent by clients: a JSON array, or a string holding one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MemberList {
    Ids(Vec<Uuid>),
    Encoded(String),
}

impl MemberList {
    /// An empty encoded list means no members were sent.
    pub fn is_blank(&self) -> bool {
        matches!(self, MemberList::Encoded(raw) if raw.trim().is_empty())
    }

    pub fn into_ids(self) -> Result<Vec<Uuid>, AppError> {
        match self {
            MemberList::Ids(ids) => Ok(ids),
            MemberList::Encoded(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Validation(format!("Invalid users list: {e}"))),
        }
    }
}
