//! PostgreSQL-backed classroom repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use classroom_application::ClassroomRepository;
use classroom_core::{AppError, AppResult};
use classroom_domain::{Classroom, ClassroomDraft, Metadata, Page, PageRequest};

use crate::deadline::{LOOKUP_DEADLINE, STORE_DEADLINE, with_deadline};
use crate::postgres_error::internal;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the classroom repository port.
#[derive(Clone)]
pub struct PostgresClassroomRepository {
    pool: PgPool,
}

impl PostgresClassroomRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClassroomRow {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    description: String,
}

impl From<ClassroomRow> for Classroom {
    fn from(row: ClassroomRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            description: row.description,
        }
    }
}

/// One row of the paged list query. The totals row is always present, the
/// classroom columns are null when the page is past the end.
#[derive(Debug, sqlx::FromRow)]
struct ClassroomListRow {
    total_records: i64,
    id: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    name: Option<String>,
    description: Option<String>,
}

impl ClassroomListRow {
    fn into_classroom(self) -> Option<Classroom> {
        Some(Classroom {
            id: self.id?,
            created_at: self.created_at?,
            name: self.name?,
            description: self.description?,
        })
    }
}

#[async_trait]
impl ClassroomRepository for PostgresClassroomRepository {
    async fn insert(&self, draft: &ClassroomDraft) -> AppResult<Classroom> {
        with_deadline(STORE_DEADLINE, "insert classroom", async {
            let row = sqlx::query_as::<_, ClassroomRow>(
                r#"
                INSERT INTO classrooms (name, description)
                VALUES ($1, $2)
                RETURNING id, created_at, name, description
                "#,
            )
            .bind(draft.name.as_str())
            .bind(draft.description.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| internal(error, "insert classroom"))?;

            Ok(Classroom::from(row))
        })
        .await
    }

    async fn find_by_id(&self, classroom_id: i64) -> AppResult<Option<Classroom>> {
        with_deadline(STORE_DEADLINE, "find classroom", async {
            let row = sqlx::query_as::<_, ClassroomRow>(
                r#"
                SELECT id, created_at, name, description
                FROM classrooms
                WHERE id = $1
                "#,
            )
            .bind(classroom_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "find classroom"))?;

            Ok(row.map(Classroom::from))
        })
        .await
    }

    async fn list(&self, name: &str, page: &PageRequest) -> AppResult<Page<Classroom>> {
        with_deadline(LOOKUP_DEADLINE, "list classrooms", async {
            let sort = page.sort();

            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "WITH matched AS (SELECT id, created_at, name, description, \
                 count(*) OVER () AS total_records, row_number() OVER (ORDER BY ",
            );
            builder.push(sort.column());
            builder.push(" ");
            builder.push(sort.direction().as_sql());
            builder.push(", id ASC) AS position FROM classrooms WHERE (LOWER(name) = LOWER(");
            builder.push_bind(name);
            builder.push(") OR ");
            builder.push_bind(name);
            builder.push(
                " = '')) SELECT totals.total_records, matched.id, matched.created_at, \
                 matched.name, matched.description \
                 FROM (SELECT COALESCE(MAX(total_records), 0) AS total_records FROM matched) AS totals \
                 LEFT JOIN matched ON matched.position > ",
            );
            builder.push_bind(page.offset());
            builder.push(" AND matched.position <= ");
            builder.push_bind(page.offset() + page.limit());
            builder.push(" ORDER BY matched.position");

            let rows = builder
                .build_query_as::<ClassroomListRow>()
                .fetch_all(&self.pool)
                .await
                .map_err(|error| internal(error, "list classrooms"))?;

            let total_records = rows.first().map_or(0, |row| row.total_records);
            let items = rows
                .into_iter()
                .filter_map(ClassroomListRow::into_classroom)
                .collect();

            Ok(Page {
                items,
                metadata: Metadata::calculate(u64::try_from(total_records).unwrap_or(0), page),
            })
        })
        .await
    }

    async fn update(&self, classroom: &Classroom) -> AppResult<Classroom> {
        with_deadline(STORE_DEADLINE, "update classroom", async {
            let row = sqlx::query_as::<_, ClassroomRow>(
                r#"
                UPDATE classrooms
                SET name = $2, description = $3
                WHERE id = $1
                RETURNING id, created_at, name, description
                "#,
            )
            .bind(classroom.id)
            .bind(classroom.name.as_str())
            .bind(classroom.description.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "update classroom"))?;

            row.map(Classroom::from).ok_or_else(|| {
                AppError::NotFound(format!("classroom '{}' not found", classroom.id))
            })
        })
        .await
    }

    async fn delete(&self, classroom_id: i64) -> AppResult<()> {
        with_deadline(STORE_DEADLINE, "delete classroom", async {
            let result = sqlx::query("DELETE FROM classrooms WHERE id = $1")
                .bind(classroom_id)
                .execute(&self.pool)
                .await
                .map_err(|error| internal(error, "delete classroom"))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "classroom '{classroom_id}' not found"
                )));
            }

            Ok(())
        })
        .await
    }
}
