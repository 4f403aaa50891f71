use classroom_application::{ClassroomRepository, TaskRepository, TaskUpdate};
use classroom_core::AppError;
use classroom_domain::{ClassroomDraft, Filters, TASK_SORT_SAFELIST, TaskDraft};

use super::PostgresTaskRepository;
use crate::PostgresClassroomRepository;
use crate::test_support::{test_pool, unique_name};

#[tokio::test]
async fn insert_links_classrooms_atomically() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let classrooms = PostgresClassroomRepository::new(pool.clone());
    let tasks = PostgresTaskRepository::new(pool);

    let Ok(classroom) = classrooms
        .insert(&ClassroomDraft {
            name: unique_name("biology"),
            description: String::new(),
        })
        .await
    else {
        panic!("classroom insert should succeed");
    };

    let header = unique_name("lab report");
    let inserted = tasks
        .insert(&TaskDraft {
            header: header.clone(),
            description: "Photosynthesis".to_owned(),
            classroom_ids: vec![classroom.id],
        })
        .await;
    let Ok(task) = inserted else {
        panic!("task insert should succeed");
    };
    assert_eq!(task.classroom_ids, vec![classroom.id]);

    let orphan = tasks
        .insert(&TaskDraft {
            header: header.clone(),
            description: String::new(),
            classroom_ids: vec![classroom.id, i64::MAX],
        })
        .await;
    match orphan {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(
                errors.get("classrooms"),
                Some("must reference existing classrooms")
            );
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }

    let Ok(request) = Filters::new(TASK_SORT_SAFELIST).page_request() else {
        panic!("filters should validate");
    };
    let listed = tasks.list(&header, &request).await;
    assert_eq!(listed.map(|page| page.metadata.total_records).ok(), Some(1));
}

#[tokio::test]
async fn update_is_guarded_by_updated_at() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tasks = PostgresTaskRepository::new(pool);

    let Ok(task) = tasks
        .insert(&TaskDraft {
            header: unique_name("essay"),
            description: String::new(),
            classroom_ids: Vec::new(),
        })
        .await
    else {
        panic!("task insert should succeed");
    };

    let first = tasks
        .update(&TaskUpdate {
            id: task.id,
            header: "Essay draft".to_owned(),
            description: "500 words".to_owned(),
            classroom_ids: None,
            expected_updated_at: task.updated_at,
        })
        .await;
    let Ok(first) = first else {
        panic!("first update should succeed");
    };
    assert!(first.updated_at > task.updated_at);

    let stale = tasks
        .update(&TaskUpdate {
            id: task.id,
            header: "Essay final".to_owned(),
            description: String::new(),
            classroom_ids: None,
            expected_updated_at: task.updated_at,
        })
        .await;
    assert!(matches!(stale, Err(AppError::Conflict(_))));

    assert!(tasks.delete(task.id).await.is_ok());
    let gone = tasks
        .update(&TaskUpdate {
            id: task.id,
            header: "Essay final".to_owned(),
            description: String::new(),
            classroom_ids: None,
            expected_updated_at: first.updated_at,
        })
        .await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}
