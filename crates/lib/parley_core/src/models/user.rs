//! User domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user. The password hash is never loaded into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub pic: String,
}

/// Fields needed to register a user row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    /// Profile picture URL; `None` falls back to the default avatar.
    pub pic: Option<&'a str>,
}
