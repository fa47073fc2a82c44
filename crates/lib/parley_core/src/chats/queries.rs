//! Chat queries and mutations.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::populate::{ChatRow, populate, populate_one};
use super::{ChatError, MIN_GROUP_MEMBERS};
use crate::models::Chat;
use crate::users::find_user;

/// Name stored on direct chats. Clients show the counterpart's name instead.
pub const DIRECT_CHAT_NAME: &str = "sender";

/// Find the direct chat whose member set is exactly `{a, b}`.
///
/// Duplicates can exist because creation takes no lock; the most recently
/// updated one wins.
pub async fn find_direct_chat(
    pool: &PgPool,
    a: &Uuid,
    b: &Uuid,
) -> Result<Option<Chat>, ChatError> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT c.id, c.chat_name, c.is_group_chat, c.group_admin_id, c.latest_message_id,
               c.created_at, c.updated_at
        FROM chats c
        WHERE c.is_group_chat = FALSE
          AND EXISTS (SELECT 1 FROM chat_members cm WHERE cm.chat_id = c.id AND cm.user_id = $1)
          AND EXISTS (SELECT 1 FROM chat_members cm WHERE cm.chat_id = c.id AND cm.user_id = $2)
          AND NOT EXISTS (
              SELECT 1 FROM chat_members cm
              WHERE cm.chat_id = c.id AND cm.user_id <> $1 AND cm.user_id <> $2
          )
        ORDER BY c.updated_at DESC, c.id DESC
        LIMIT 1
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(populate_one(pool, row).await?)),
        None => Ok(None),
    }
}

/// Return the direct chat between `caller` and `counterpart`, creating it if absent.
pub async fn access_direct_chat(
    pool: &PgPool,
    caller: &Uuid,
    counterpart: &Uuid,
) -> Result<Chat, ChatError> {
    if caller == counterpart {
        return Err(ChatError::Validation(
            "Cannot start a chat with yourself".into(),
        ));
    }

    if let Some(chat) = find_direct_chat(pool, caller, counterpart).await? {
        debug!(chat_id = %chat.id, "direct chat already exists");
        return Ok(chat);
    }

    if find_user(pool, counterpart).await?.is_none() {
        return Err(ChatError::UserNotFound);
    }

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        INSERT INTO chats (id, chat_name, is_group_chat)
        VALUES ($1, $2, FALSE)
        RETURNING id, chat_name, is_group_chat, group_admin_id, latest_message_id,
                  created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(DIRECT_CHAT_NAME)
    .fetch_one(&mut *tx)
    .await?;
    insert_members(&mut tx, &row.id, &[*caller, *counterpart]).await?;
    tx.commit().await?;

    info!(chat_id = %row.id, user_id = %caller, "created direct chat");
    Ok(populate_one(pool, row).await?)
}

/// List every chat `user_id` belongs to, most recently updated first.
pub async fn list_chats(pool: &PgPool, user_id: &Uuid) -> Result<Vec<Chat>, ChatError> {
    let rows = sqlx::query_as::<_, ChatRow>(
        r#"
        SELECT c.id, c.chat_name, c.is_group_chat, c.group_admin_id, c.latest_message_id,
               c.created_at, c.updated_at
        FROM chats c
        WHERE EXISTS (SELECT 1 FROM chat_members cm WHERE cm.chat_id = c.id AND cm.user_id = $1)
        ORDER BY c.updated_at DESC, c.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(populate(pool, rows).await?)
}

/// Dedupe the requested members, drop the admin and append it last.
///
/// Fails unless at least [`MIN_GROUP_MEMBERS`] distinct users besides the
/// admin remain.
pub fn group_member_ids(admin: &Uuid, members: &[Uuid]) -> Result<Vec<Uuid>, ChatError> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(members.len() + 1);
    for id in members {
        if id != admin && !ids.contains(id) {
            ids.push(*id);
        }
    }

    if ids.len() < MIN_GROUP_MEMBERS {
        return Err(ChatError::Validation(
            "More than 2 users required to form a group chat".into(),
        ));
    }

    ids.push(*admin);
    Ok(ids)
}

/// Create a group chat administered (and joined) by `admin`.
pub async fn create_group_chat(
    pool: &PgPool,
    admin: &Uuid,
    name: &str,
    members: &[Uuid],
) -> Result<Chat, ChatError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ChatError::Validation("Group name is required".into()));
    }
    let member_ids = group_member_ids(admin, members)?;

    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        INSERT INTO chats (id, chat_name, is_group_chat, group_admin_id)
        VALUES ($1, $2, TRUE, $3)
        RETURNING id, chat_name, is_group_chat, group_admin_id, latest_message_id,
                  created_at, updated_at
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(admin)
    .fetch_one(&mut *tx)
    .await
    .map_err(ChatError::from_member_write)?;
    insert_members(&mut tx, &row.id, &member_ids).await?;
    tx.commit().await?;

    info!(chat_id = %row.id, user_id = %admin, members = member_ids.len(), "created group chat");
    Ok(populate_one(pool, row).await?)
}

/// Rename a chat.
pub async fn rename_chat(pool: &PgPool, chat_id: &Uuid, name: &str) -> Result<Chat, ChatError> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        UPDATE chats
        SET chat_name = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, chat_name, is_group_chat, group_admin_id, latest_message_id,
                  created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(chat_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ChatError::ChatNotFound)?;

    info!(chat_id = %chat_id, "renamed chat");
    Ok(populate_one(pool, row).await?)
}

/// Add `user_id` to a chat. Adding an existing member is a no-op.
pub async fn add_member(pool: &PgPool, chat_id: &Uuid, user_id: &Uuid) -> Result<Chat, ChatError> {
    let mut tx = pool.begin().await?;
    let row = touch_chat(&mut tx, chat_id)
        .await?
        .ok_or(ChatError::ChatNotFound)?;
    insert_members(&mut tx, chat_id, &[*user_id]).await?;
    tx.commit().await?;

    info!(chat_id = %chat_id, user_id = %user_id, "added chat member");
    Ok(populate_one(pool, row).await?)
}

/// Remove `user_id` from a chat.
///
/// Removing the admin, the last member or a non-member is allowed.
pub async fn remove_member(
    pool: &PgPool,
    chat_id: &Uuid,
    user_id: &Uuid,
) -> Result<Chat, ChatError> {
    let mut tx = pool.begin().await?;
    let row = touch_chat(&mut tx, chat_id)
        .await?
        .ok_or(ChatError::ChatNotFound)?;
    let removed = sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND user_id = $2")
        .bind(chat_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    tx.commit().await?;

    info!(chat_id = %chat_id, user_id = %user_id, removed, "removed chat member");
    Ok(populate_one(pool, row).await?)
}

/// Bump `updated_at`, returning the row if the chat exists.
async fn touch_chat(conn: &mut PgConnection, chat_id: &Uuid) -> Result<Option<ChatRow>, ChatError> {
    let row = sqlx::query_as::<_, ChatRow>(
        r#"
        UPDATE chats
        SET updated_at = now()
        WHERE id = $1
        RETURNING id, chat_name, is_group_chat, group_admin_id, latest_message_id,
                  created_at, updated_at
        "#,
    )
    .bind(chat_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

async fn insert_members(
    conn: &mut PgConnection,
    chat_id: &Uuid,
    user_ids: &[Uuid],
) -> Result<(), ChatError> {
    sqlx::query(
        r#"
        INSERT INTO chat_members (chat_id, user_id)
        SELECT $1, member FROM UNNEST($2::uuid[]) AS member
        ON CONFLICT (chat_id, user_id) DO NOTHING
        "#,
    )
    .bind(chat_id)
    .bind(user_ids)
    .execute(&mut *conn)
    .await
    .map_err(ChatError::from_member_write)?;
    Ok(())
}
