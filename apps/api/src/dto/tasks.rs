use chrono::{DateTime, Utc};
use classroom_application::TaskPatch;
use classroom_domain::{Metadata, Task, TaskDraft};
use serde::{Deserialize, Serialize};

/// Incoming payload for task creation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub classrooms: Vec<i64>,
}

impl From<CreateTaskRequest> for TaskDraft {
    fn from(value: CreateTaskRequest) -> Self {
        Self {
            header: value.header,
            description: value.description,
            classroom_ids: value.classrooms,
        }
    }
}

/// Incoming payload for a partial task update.
///
/// `updated_at` echoes the version the client edited; a stale value is
/// rejected as an edit conflict.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub header: Option<String>,
    pub description: Option<String>,
    pub classrooms: Option<Vec<i64>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(value: UpdateTaskRequest) -> Self {
        Self {
            header: value.header,
            description: value.description,
            classroom_ids: value.classrooms,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub metadata: Metadata,
}
