//! PostgreSQL-backed task repository.
//!
//! Tasks and their classroom associations are written in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use classroom_application::{EDIT_CONFLICT, TaskRepository, TaskUpdate};
use classroom_core::{AppError, AppResult};
use classroom_domain::{Metadata, Page, PageRequest, Task, TaskDraft};

use crate::deadline::{LOOKUP_DEADLINE, STORE_DEADLINE, with_deadline};
use crate::postgres_error::{internal, unknown_classroom_or_internal};

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the task repository port.
#[derive(Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    header: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    classroom_ids: Vec<i64>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            header: row.header,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            classroom_ids: row.classroom_ids,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskListRow {
    total_records: i64,
    id: Option<i64>,
    header: Option<String>,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    classroom_ids: Option<Vec<i64>>,
}

impl TaskListRow {
    fn into_task(self) -> Option<Task> {
        Some(Task {
            id: self.id?,
            header: self.header?,
            description: self.description?,
            created_at: self.created_at?,
            updated_at: self.updated_at?,
            classroom_ids: self.classroom_ids.unwrap_or_default(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TaskColumnsRow {
    id: i64,
    header: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskColumnsRow {
    fn with_classrooms(self, classroom_ids: Vec<i64>) -> Task {
        Task {
            id: self.id,
            header: self.header,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            classroom_ids,
        }
    }
}

async fn link_classrooms(
    transaction: &mut Transaction<'_, Postgres>,
    task_id: i64,
    classroom_ids: &[i64],
) -> AppResult<()> {
    if classroom_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO classroom_tasks (classroom_id, task_id)
        SELECT classroom_id, $2
        FROM UNNEST($1::BIGINT[]) AS classroom_id
        "#,
    )
    .bind(classroom_ids)
    .bind(task_id)
    .execute(&mut **transaction)
    .await
    .map_err(|error| unknown_classroom_or_internal(error, "link task to classrooms"))?;

    Ok(())
}

async fn linked_classrooms(
    transaction: &mut Transaction<'_, Postgres>,
    task_id: i64,
) -> AppResult<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT classroom_id
        FROM classroom_tasks
        WHERE task_id = $1
        ORDER BY classroom_id
        "#,
    )
    .bind(task_id)
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| internal(error, "load task classrooms"))
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, draft: &TaskDraft) -> AppResult<Task> {
        with_deadline(STORE_DEADLINE, "insert task", async {
            let mut transaction = self
                .pool
                .begin()
                .await
                .map_err(|error| internal(error, "begin task insert"))?;

            let row = sqlx::query_as::<_, TaskColumnsRow>(
                r#"
                INSERT INTO tasks (header, description)
                VALUES ($1, $2)
                RETURNING id, header, description, created_at, updated_at
                "#,
            )
            .bind(draft.header.as_str())
            .bind(draft.description.as_str())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| internal(error, "insert task"))?;

            link_classrooms(&mut transaction, row.id, &draft.classroom_ids).await?;
            let classroom_ids = linked_classrooms(&mut transaction, row.id).await?;

            transaction
                .commit()
                .await
                .map_err(|error| internal(error, "commit task insert"))?;

            Ok(row.with_classrooms(classroom_ids))
        })
        .await
    }

    async fn find_by_id(&self, task_id: i64) -> AppResult<Option<Task>> {
        with_deadline(STORE_DEADLINE, "find task", async {
            let row = sqlx::query_as::<_, TaskRow>(
                r#"
                SELECT id, header, description, created_at, updated_at,
                    ARRAY(
                        SELECT classroom_id FROM classroom_tasks
                        WHERE task_id = tasks.id ORDER BY classroom_id
                    ) AS classroom_ids
                FROM tasks
                WHERE id = $1
                "#,
            )
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal(error, "find task"))?;

            Ok(row.map(Task::from))
        })
        .await
    }

    async fn list(&self, header: &str, page: &PageRequest) -> AppResult<Page<Task>> {
        with_deadline(LOOKUP_DEADLINE, "list tasks", async {
            let sort = page.sort();

            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "WITH matched AS (SELECT id, header, description, created_at, updated_at, \
                 ARRAY(SELECT classroom_id FROM classroom_tasks \
                 WHERE task_id = tasks.id ORDER BY classroom_id) AS classroom_ids, \
                 count(*) OVER () AS total_records, row_number() OVER (ORDER BY ",
            );
            builder.push(sort.column());
            builder.push(" ");
            builder.push(sort.direction().as_sql());
            builder.push(", id ASC) AS position FROM tasks WHERE (LOWER(header) = LOWER(");
            builder.push_bind(header);
            builder.push(") OR ");
            builder.push_bind(header);
            builder.push(
                " = '')) SELECT totals.total_records, matched.id, matched.header, \
                 matched.description, matched.created_at, matched.updated_at, \
                 matched.classroom_ids \
                 FROM (SELECT COALESCE(MAX(total_records), 0) AS total_records FROM matched) AS totals \
                 LEFT JOIN matched ON matched.position > ",
            );
            builder.push_bind(page.offset());
            builder.push(" AND matched.position <= ");
            builder.push_bind(page.offset() + page.limit());
            builder.push(" ORDER BY matched.position");

            let rows = builder
                .build_query_as::<TaskListRow>()
                .fetch_all(&self.pool)
                .await
                .map_err(|error| internal(error, "list tasks"))?;

            let total_records = rows.first().map_or(0, |row| row.total_records);
            let items = rows.into_iter().filter_map(TaskListRow::into_task).collect();

            Ok(Page {
                items,
                metadata: Metadata::calculate(u64::try_from(total_records).unwrap_or(0), page),
            })
        })
        .await
    }

    async fn update(&self, update: &TaskUpdate) -> AppResult<Task> {
        with_deadline(STORE_DEADLINE, "update task", async {
            let mut transaction = self
                .pool
                .begin()
                .await
                .map_err(|error| internal(error, "begin task update"))?;

            let row = sqlx::query_as::<_, TaskColumnsRow>(
                r#"
                UPDATE tasks
                SET header = $3,
                    description = $4,
                    updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
                WHERE id = $1 AND updated_at = $2
                RETURNING id, header, description, created_at, updated_at
                "#,
            )
            .bind(update.id)
            .bind(update.expected_updated_at)
            .bind(update.header.as_str())
            .bind(update.description.as_str())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| internal(error, "update task"))?;

            let Some(row) = row else {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1)",
                )
                .bind(update.id)
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| internal(error, "check task existence"))?;

                return Err(if exists {
                    AppError::Conflict(EDIT_CONFLICT.to_owned())
                } else {
                    AppError::NotFound(format!("task '{}' not found", update.id))
                });
            };

            if let Some(classroom_ids) = &update.classroom_ids {
                sqlx::query("DELETE FROM classroom_tasks WHERE task_id = $1")
                    .bind(update.id)
                    .execute(&mut *transaction)
                    .await
                    .map_err(|error| internal(error, "unlink task from classrooms"))?;
                link_classrooms(&mut transaction, update.id, classroom_ids).await?;
            }
            let classroom_ids = linked_classrooms(&mut transaction, update.id).await?;

            transaction
                .commit()
                .await
                .map_err(|error| internal(error, "commit task update"))?;

            Ok(row.with_classrooms(classroom_ids))
        })
        .await
    }

    async fn delete(&self, task_id: i64) -> AppResult<()> {
        with_deadline(STORE_DEADLINE, "delete task", async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(task_id)
                .execute(&self.pool)
                .await
                .map_err(|error| internal(error, "delete task"))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("task '{task_id}' not found")));
            }

            Ok(())
        })
        .await
    }
}
