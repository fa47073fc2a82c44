//! Database migration support.
//!
//! Embeds the SQL migrations from `parley_core/migrations/`.

use sqlx::PgPool;
use sqlx::migrate::Migrator;

/// Embedded migrator, also used by `#[sqlx::test]` fixtures.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
