//! Expansion of chat references.
//!
//! A chat row only stores IDs for its members, admin and latest message.
//! `populate` resolves them with one query per reference kind, regardless of
//! how many chats are being expanded, and keeps the input order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Chat, MessageSummary, User};

/// Row returned by chat queries before expansion.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ChatRow {
    pub id: Uuid,
    pub chat_name: String,
    pub is_group_chat: bool,
    pub group_admin_id: Option<Uuid>,
    pub latest_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    chat_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
    pic: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    chat_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    sender_id: Uuid,
    sender_name: String,
    sender_email: String,
    sender_pic: String,
}

/// Expand a single row.
pub(crate) async fn populate_one(pool: &PgPool, row: ChatRow) -> Result<Chat, sqlx::Error> {
    populate(pool, vec![row])
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)
}

/// Expand member, admin and latest-message references for `rows`.
pub(crate) async fn populate(pool: &PgPool, rows: Vec<ChatRow>) -> Result<Vec<Chat>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let chat_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let admin_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.group_admin_id).collect();
    let message_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.latest_message_id).collect();

    let members = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT cm.chat_id, u.id, u.name, u.email, u.pic
        FROM chat_members cm
        JOIN users u ON u.id = cm.user_id
        WHERE cm.chat_id = ANY($1)
        ORDER BY cm.joined_at ASC, u.id ASC
        "#,
    )
    .bind(&chat_ids)
    .fetch_all(pool)
    .await?;

    let mut members_by_chat: HashMap<Uuid, Vec<User>> = HashMap::new();
    for m in members {
        members_by_chat.entry(m.chat_id).or_default().push(User {
            id: m.id,
            name: m.name,
            email: m.email,
            pic: m.pic,
        });
    }

    let admins: HashMap<Uuid, User> = if admin_ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query_as::<_, User>("SELECT id, name, email, pic FROM users WHERE id = ANY($1)")
            .bind(&admin_ids)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect()
    };

    let messages: HashMap<Uuid, MessageSummary> = if message_ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.chat_id, m.content, m.created_at,
                   u.id AS sender_id, u.name AS sender_name,
                   u.email AS sender_email, u.pic AS sender_pic
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = ANY($1)
            "#,
        )
        .bind(&message_ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|m| {
            (
                m.id,
                MessageSummary {
                    id: m.id,
                    chat_id: m.chat_id,
                    sender: User {
                        id: m.sender_id,
                        name: m.sender_name,
                        email: m.sender_email,
                        pic: m.sender_pic,
                    },
                    content: m.content,
                    created_at: m.created_at,
                },
            )
        })
        .collect()
    };

    Ok(rows
        .into_iter()
        .map(|row| Chat {
            users: members_by_chat.remove(&row.id).unwrap_or_default(),
            group_admin: row.group_admin_id.and_then(|id| admins.get(&id).cloned()),
            latest_message: row
                .latest_message_id
                .and_then(|id| messages.get(&id).cloned()),
            id: row.id,
            chat_name: row.chat_name,
            is_group_chat: row.is_group_chat,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}
