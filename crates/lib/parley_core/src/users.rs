//! User persistence.
//!
//! Chats reference users but never own them. Registration lives with the auth
//! service; this module only covers what the chat service needs to seed and
//! look up members.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{NewUser, User};

/// Avatar assigned when a user registers without a profile picture.
pub const DEFAULT_PIC: &str =
    "https://icon-library.com/images/anonymous-avatar-icon/anonymous-avatar-icon-25.jpg";

/// Insert a user row, returning its public view.
pub async fn create_user(pool: &PgPool, user: &NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, pic)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, pic
        "#,
    )
    .bind(Uuid::now_v7())
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.pic.unwrap_or(DEFAULT_PIC))
    .fetch_one(pool)
    .await
}

/// Fetch a user's public view by ID.
pub async fn find_user(pool: &PgPool, user_id: &Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email, pic FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrator = "crate::migrate::MIGRATOR")]
    async fn create_user_applies_default_pic(pool: PgPool) -> Result<(), sqlx::Error> {
        let user = create_user(
            &pool,
            &NewUser {
                name: "Ada",
                email: "ada@example.com",
                password_hash: "x",
                pic: None,
            },
        )
        .await?;

        assert_eq!(DEFAULT_PIC, user.pic);
        assert_eq!(Some(user.clone()), find_user(&pool, &user.id).await?);
        Ok(())
    }

    #[sqlx::test(migrator = "crate::migrate::MIGRATOR")]
    async fn find_user_returns_none_for_unknown_id(pool: PgPool) -> Result<(), sqlx::Error> {
        assert_eq!(None, find_user(&pool, &Uuid::now_v7()).await?);
        Ok(())
    }
}
