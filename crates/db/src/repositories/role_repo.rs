//! Repository for the `roles` lookup table.

use devicegate_core::types::DbId;
use sqlx::PgPool;

/// Provides lookups on roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Resolve a role id to its name. Errors with `RowNotFound` if the
    /// id does not exist (roles are seed data; a miss is a bug).
    pub async fn resolve_name(pool: &PgPool, role_id: DbId) -> Result<String, sqlx::Error> {
        sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_one(pool)
            .await
    }

    /// Resolve a role name to its id.
    pub async fn find_id_by_name(pool: &PgPool, name: &str) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
