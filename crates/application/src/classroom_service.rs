use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use classroom_core::{AppError, AppResult, Validator};
use classroom_domain::{Classroom, ClassroomDraft, Filters, Page, PageRequest, validate_classroom};


/// Repository port for classroom persistence.
#[async_trait]
pub trait ClassroomRepository: Send + Sync {
    /// Inserts a classroom and returns it with its id and creation time.
    async fn insert(&self, draft: &ClassroomDraft) -> AppResult<Classroom>;

    /// Finds a classroom by id.
    async fn find_by_id(&self, classroom_id: i64) -> AppResult<Option<Classroom>>;

    /// Lists classrooms whose name equals `name` case-insensitively, or all
    /// classrooms when `name` is empty.
    async fn list(&self, name: &str, page: &PageRequest) -> AppResult<Page<Classroom>>;

    /// Writes name and description. Returns `NotFound` when the row is gone.
    async fn update(&self, classroom: &Classroom) -> AppResult<Classroom>;

    /// Deletes a classroom. Returns `NotFound` when no row was deleted.
    async fn delete(&self, classroom_id: i64) -> AppResult<()>;
}

/// Partial classroom update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClassroomPatch {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Application service for classrooms.
#[derive(Clone)]
pub struct ClassroomService {
    repository: Arc<dyn ClassroomRepository>,
}

impl ClassroomService {
    /// Creates a new classroom service.
    #[must_use]
    pub fn new(repository: Arc<dyn ClassroomRepository>) -> Self {
        Self { repository }
    }

    /// Validates and stores a new classroom.
    pub async fn create(&self, draft: ClassroomDraft) -> AppResult<Classroom> {
        let mut validator = Validator::new();
        validate_classroom(&mut validator, &draft.name, &draft.description);
        validator.finish()?;

        let classroom = self.repository.insert(&draft).await?;
        info!(classroom_id = classroom.id, "created classroom");

        Ok(classroom)
    }

    /// Returns one classroom.
    pub async fn get(&self, classroom_id: i64) -> AppResult<Classroom> {
        self.repository
            .find_by_id(classroom_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("classroom '{classroom_id}' not found")))
    }

    /// Lists one page of classrooms.
    ///
    /// `validator` carries failures found while reading the raw query string;
    /// they are reported together with paging and sort failures and no store
    /// call is made unless everything is valid.
    pub async fn list(
        &self,
        name: &str,
        filters: &Filters,
        validator: Validator,
    ) -> AppResult<Page<Classroom>> {
        let page = filters.checked_page_request(validator)?;

        self.repository.list(name, &page).await
    }

    /// Applies a partial update. Last write wins.
    pub async fn update(&self, classroom_id: i64, patch: ClassroomPatch) -> AppResult<Classroom> {
        let mut classroom = self.get(classroom_id).await?;

        if let Some(name) = patch.name {
            classroom.name = name;
        }
        if let Some(description) = patch.description {
            classroom.description = description;
        }

        let mut validator = Validator::new();
        validate_classroom(&mut validator, &classroom.name, &classroom.description);
        validator.finish()?;

        self.repository.update(&classroom).await
    }

    /// Deletes a classroom and its task associations.
    pub async fn delete(&self, classroom_id: i64) -> AppResult<()> {
        self.repository.delete(classroom_id).await?;
        info!(classroom_id, "deleted classroom");

        Ok(())
    }
}
