//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use classroom_application::{NewUser, UserRecord, UserRepository};
use classroom_core::{AppError, AppResult};
use classroom_domain::{User, UserId};

use crate::deadline::{STORE_DEADLINE, with_deadline};
use crate::postgres_error::{duplicate_email_or_internal, internal};


/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    first_name: String,
    last_name: String,
    email: String,
    activated: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            created_at: row.created_at,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            activated: row.activated,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl From<UserRecordRow> for UserRecord {
    fn from(row: UserRecordRow) -> Self {
        Self {
            user: User::from(row.user),
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        with_deadline(STORE_DEADLINE, "insert user", async {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (first_name, last_name, email, password_hash)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, first_name, last_name, email, activated
                "#,
            )
            .bind(user.first_name.as_str())
            .bind(user.last_name.as_str())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| duplicate_email_or_internal(error, "insert user"))?;

            Ok(User::from(row))
        })
        .await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        with_deadline(STORE_DEADLINE, "find user by id", async {
            let row = sqlx::query_as::<_, UserRecordRow>(
                r#"
                SELECT id, created_at, first_name, last_name, email, activated, password_hash
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "find user by id"))?;

            Ok(row.map(UserRecord::from))
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        with_deadline(STORE_DEADLINE, "find user by email", async {
            let row = sqlx::query_as::<_, UserRecordRow>(
                r#"
                SELECT id, created_at, first_name, last_name, email, activated, password_hash
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "find user by email"))?;

            Ok(row.map(UserRecord::from))
        })
        .await
    }

    async fn update(&self, record: &UserRecord) -> AppResult<User> {
        with_deadline(STORE_DEADLINE, "update user", async {
            let row = sqlx::query_as::<_, UserRow>(
                r#"
                UPDATE users
                SET first_name = $2, last_name = $3, email = $4, password_hash = $5,
                    activated = $6
                WHERE id = $1
                RETURNING id, created_at, first_name, last_name, email, activated
                "#,
            )
            .bind(record.user.id.as_i64())
            .bind(record.user.first_name.as_str())
            .bind(record.user.last_name.as_str())
            .bind(record.user.email.as_str())
            .bind(record.password_hash.as_str())
            .bind(record.user.activated)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| duplicate_email_or_internal(error, "update user"))?;

            row.map(User::from)
                .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", record.user.id)))
        })
        .await
    }

    async fn delete(&self, user_id: UserId) -> AppResult<()> {
        with_deadline(STORE_DEADLINE, "delete user", async {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id.as_i64())
                .execute(&self.pool)
                .await
                .map_err(|error| internal(error, "delete user"))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("user '{user_id}' not found")));
            }

            Ok(())
        })
        .await
    }
}
