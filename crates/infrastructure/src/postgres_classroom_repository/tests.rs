use classroom_application::ClassroomRepository;
use classroom_core::AppError;
use classroom_domain::{CLASSROOM_SORT_SAFELIST, ClassroomDraft, Filters};

use super::PostgresClassroomRepository;
use crate::test_support::{test_pool, unique_name};

#[tokio::test]
async fn insert_find_update_delete_roundtrip() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresClassroomRepository::new(pool);

    let inserted = repository
        .insert(&ClassroomDraft {
            name: unique_name("algebra"),
            description: "Tuesday mornings".to_owned(),
        })
        .await;
    let Ok(mut classroom) = inserted else {
        panic!("insert should succeed");
    };

    let found = repository.find_by_id(classroom.id).await;
    assert_eq!(found.ok().flatten(), Some(classroom.clone()));

    classroom.description = "Thursday afternoons".to_owned();
    let updated = repository.update(&classroom).await;
    assert_eq!(
        updated.map(|classroom| classroom.description).ok(),
        Some("Thursday afternoons".to_owned())
    );

    assert!(repository.delete(classroom.id).await.is_ok());
    assert!(matches!(
        repository.delete(classroom.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        repository.update(&classroom).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_pages_a_case_insensitive_name_match() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresClassroomRepository::new(pool);
    let name = unique_name("Geometry");

    for index in 0..10 {
        let draft = ClassroomDraft {
            name: name.clone(),
            description: format!("section {index}"),
        };
        assert!(repository.insert(&draft).await.is_ok());
    }

    let mut filters = Filters::new(CLASSROOM_SORT_SAFELIST);
    filters.page_size = 4;
    filters.page = 3;
    let Ok(request) = filters.page_request() else {
        panic!("filters should validate");
    };
    let Ok(page) = repository.list(&name.to_uppercase(), &request).await else {
        panic!("list should succeed");
    };
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.metadata.total_records, 10);
    assert_eq!(page.metadata.last_page, 3);

    filters.page = 4;
    let Ok(request) = filters.page_request() else {
        panic!("filters should validate");
    };
    let Ok(past_end) = repository.list(&name, &request).await else {
        panic!("list should succeed");
    };
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.metadata.total_records, 10);

    filters.page = 1;
    filters.page_size = 100;
    filters.sort = "-id".to_owned();
    let Ok(request) = filters.page_request() else {
        panic!("filters should validate");
    };
    let Ok(descending) = repository.list(&name, &request).await else {
        panic!("list should succeed");
    };
    let ids = descending
        .items
        .iter()
        .map(|classroom| classroom.id)
        .collect::<Vec<_>>();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|left, right| right.cmp(left));
    assert_eq!(ids, sorted);
}
