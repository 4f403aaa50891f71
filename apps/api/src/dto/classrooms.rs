use classroom_application::ClassroomPatch;
use classroom_domain::{Classroom, ClassroomDraft, Metadata};
use serde::{Deserialize, Serialize};

/// Incoming payload for classroom creation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateClassroomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<CreateClassroomRequest> for ClassroomDraft {
    fn from(value: CreateClassroomRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

/// Incoming payload for a partial classroom update.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateClassroomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateClassroomRequest> for ClassroomPatch {
    fn from(value: UpdateClassroomRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassroomResponse {
    pub classroom: Classroom,
}

#[derive(Debug, Serialize)]
pub struct ClassroomListResponse {
    pub classrooms: Vec<Classroom>,
    pub metadata: Metadata,
}
