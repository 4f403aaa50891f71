//! PostgreSQL-backed token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use classroom_application::TokenRepository;
use classroom_core::AppResult;
use classroom_domain::{Token, TokenScope, User, UserId};

use crate::deadline::{LOOKUP_DEADLINE, STORE_DEADLINE, with_deadline};
use crate::postgres_error::internal;
use crate::postgres_user_repository::UserRow;

/// PostgreSQL implementation of the token repository port.
#[derive(Clone)]
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn insert(&self, token: &Token) -> AppResult<()> {
        with_deadline(STORE_DEADLINE, "insert token", async {
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(token.hash.as_str())
            .bind(token.user_id.as_i64())
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| internal(error, "insert token"))?;

            Ok(())
        })
        .await
    }

    async fn find_user_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        with_deadline(LOOKUP_DEADLINE, "find user for token", async {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT users.id, users.created_at, users.first_name, users.last_name,
                    users.email, users.activated
                FROM users
                INNER JOIN tokens ON users.id = tokens.user_id
                WHERE tokens.hash = $1 AND tokens.scope = $2 AND tokens.expiry > $3
                "#,
            )
            .bind(token_hash)
            .bind(scope.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "find user for token"))?;

            Ok(row.map(User::from))
        })
        .await
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: UserId) -> AppResult<()> {
        with_deadline(STORE_DEADLINE, "delete tokens", async {
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                .bind(scope.as_str())
                .bind(user_id.as_i64())
                .execute(&self.pool)
                .await
                .map_err(|error| internal(error, "delete tokens"))?;

            Ok(())
        })
        .await
    }
}
