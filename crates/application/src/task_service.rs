use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use classroom_core::{AppError, AppResult, Validator};
use classroom_domain::{
    Filters, Page, PageRequest, Task, TaskDraft, validate_classroom_ids, validate_task,
};


/// Task write carrying the version the caller read.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    /// Task id.
    pub id: i64,
    /// New header.
    pub header: String,
    /// New description.
    pub description: String,
    /// Replacement classroom associations, or `None` to keep the current ones.
    pub classroom_ids: Option<Vec<i64>>,
    /// `updated_at` observed when the task was read.
    pub expected_updated_at: DateTime<Utc>,
}

/// Repository port for task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task and its classroom associations atomically.
    ///
    /// Unknown classroom ids fail the whole insert with a field error on
    /// `classrooms`.
    async fn insert(&self, draft: &TaskDraft) -> AppResult<Task>;

    /// Finds a task by id, including its classroom ids.
    async fn find_by_id(&self, task_id: i64) -> AppResult<Option<Task>>;

    /// Lists tasks whose header equals `header` case-insensitively, or all
    /// tasks when `header` is empty.
    async fn list(&self, header: &str, page: &PageRequest) -> AppResult<Page<Task>>;

    /// Writes the task when its stored `updated_at` still equals
    /// `expected_updated_at`, bumping `updated_at`. Returns `Conflict` when the
    /// version moved and `NotFound` when the row is gone.
    async fn update(&self, update: &TaskUpdate) -> AppResult<Task>;

    /// Deletes a task and its associations. Returns `NotFound` when no row was
    /// deleted.
    async fn delete(&self, task_id: i64) -> AppResult<()>;
}

/// Partial task update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New header.
    pub header: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement classroom associations.
    pub classroom_ids: Option<Vec<i64>>,
    /// Version the caller based its edit on. Defaults to the version read
    /// right before writing.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Message carried by edit conflicts.
pub const EDIT_CONFLICT: &str =
    "unable to update the record due to an edit conflict, please try again";

/// Application service for tasks.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    /// Creates a new task service.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Validates and stores a new task with its classroom associations.
    pub async fn create(&self, draft: TaskDraft) -> AppResult<Task> {
        let mut validator = Validator::new();
        validate_task(&mut validator, &draft.header, &draft.description);
        validate_classroom_ids(&mut validator, &draft.classroom_ids);
        validator.finish()?;

        let task = self.repository.insert(&draft).await?;
        info!(
            task_id = task.id,
            classrooms = task.classroom_ids.len(),
            "created task"
        );

        Ok(task)
    }

    /// Returns one task.
    pub async fn get(&self, task_id: i64) -> AppResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' not found")))
    }

    /// Lists one page of tasks. See [`crate::ClassroomService::list`] for how
    /// `validator` is used.
    pub async fn list(
        &self,
        header: &str,
        filters: &Filters,
        validator: Validator,
    ) -> AppResult<Page<Task>> {
        let page = filters.checked_page_request(validator)?;

        self.repository.list(header, &page).await
    }

    /// Applies a partial update guarded by optimistic concurrency.
    pub async fn update(&self, task_id: i64, patch: TaskPatch) -> AppResult<Task> {
        let current = self.get(task_id).await?;

        let update = TaskUpdate {
            id: current.id,
            header: patch.header.unwrap_or(current.header),
            description: patch.description.unwrap_or(current.description),
            classroom_ids: patch.classroom_ids,
            expected_updated_at: patch.updated_at.unwrap_or(current.updated_at),
        };

        let mut validator = Validator::new();
        validate_task(&mut validator, &update.header, &update.description);
        if let Some(classroom_ids) = &update.classroom_ids {
            validate_classroom_ids(&mut validator, classroom_ids);
        }
        validator.finish()?;

        self.repository.update(&update).await
    }

    /// Deletes a task.
    pub async fn delete(&self, task_id: i64) -> AppResult<()> {
        self.repository.delete(task_id).await?;
        info!(task_id, "deleted task");

        Ok(())
    }
}
