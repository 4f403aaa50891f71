//! PostgreSQL-backed permission grants.

use async_trait::async_trait;
use sqlx::PgPool;

use classroom_application::PermissionRepository;
use classroom_core::AppResult;
use classroom_domain::UserId;

use crate::deadline::{LOOKUP_DEADLINE, STORE_DEADLINE, with_deadline};
use crate::postgres_error::internal;

/// PostgreSQL implementation of the permission repository port.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AppResult<()> {
        let codes = codes.iter().map(|code| (*code).to_owned()).collect::<Vec<_>>();

        with_deadline(STORE_DEADLINE, "grant permissions", async {
            sqlx::query(
                r#"
                INSERT INTO users_permissions (user_id, permission_id)
                SELECT $1, permissions.id
                FROM permissions
                WHERE permissions.code = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id.as_i64())
            .bind(&codes)
            .execute(&self.pool)
            .await
            .map_err(|error| internal(error, "grant permissions"))?;

            Ok(())
        })
        .await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        with_deadline(LOOKUP_DEADLINE, "list permissions", async {
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT permissions.code
                FROM permissions
                INNER JOIN users_permissions
                    ON users_permissions.permission_id = permissions.id
                WHERE users_permissions.user_id = $1
                ORDER BY permissions.code
                "#,
            )
            .bind(user_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| internal(error, "list permissions"))
        })
        .await
    }
}
