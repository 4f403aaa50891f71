use chrono::{Duration, Utc};
use classroom_application::{
    ClassroomRepository, NewUser, PermissionRepository, TaskRepository, TaskUpdate,
    TokenRepository, UserRepository,
};
use classroom_core::AppError;
use classroom_domain::{
    CLASSROOM_SORT_SAFELIST, Classroom, ClassroomDraft, Filters, Page, TASK_SORT_SAFELIST,
    TaskDraft, Token, TokenScope,
};

use super::InMemoryStore;

fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: email.to_owned(),
        password_hash: "$argon2id$placeholder".to_owned(),
    }
}

async fn seed_classrooms(store: &InMemoryStore, names: &[&str]) {
    for name in names {
        let draft = ClassroomDraft {
            name: (*name).to_owned(),
            description: String::new(),
        };
        assert!(ClassroomRepository::insert(store, &draft).await.is_ok());
    }
}

#[tokio::test]
async fn user_emails_are_unique() {
    let store = InMemoryStore::new();

    assert!(
        UserRepository::insert(&store, &new_user("ada@example.com"))
            .await
            .is_ok()
    );
    match UserRepository::insert(&store, &new_user("ada@example.com")).await {
        Err(AppError::Duplicate { field }) => assert_eq!(field, "email"),
        other => panic!("expected duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_a_user_cascades_to_tokens_and_grants() {
    let store = InMemoryStore::new();
    let Ok(user) = UserRepository::insert(&store, &new_user("ada@example.com")).await else {
        panic!("insert should succeed");
    };
    let token = Token {
        plaintext: String::new(),
        hash: "hash".to_owned(),
        user_id: user.id,
        expiry: Utc::now() + Duration::hours(1),
        scope: TokenScope::Authentication,
    };
    assert!(TokenRepository::insert(&store, &token).await.is_ok());
    assert!(store.add_for_user(user.id, &["task:read"]).await.is_ok());

    assert!(UserRepository::delete(&store, user.id).await.is_ok());

    let owner = store
        .find_user_for_token(TokenScope::Authentication, "hash", Utc::now())
        .await;
    assert!(matches!(owner, Ok(None)));
    let granted = store.list_for_user(user.id).await;
    assert_eq!(granted.ok(), Some(Vec::new()));
}

#[tokio::test]
async fn unknown_permission_codes_are_ignored() {
    let store = InMemoryStore::new();
    let Ok(user) = UserRepository::insert(&store, &new_user("ada@example.com")).await else {
        panic!("insert should succeed");
    };

    assert!(
        store
            .add_for_user(user.id, &["task:write", "admin:everything"])
            .await
            .is_ok()
    );
    assert_eq!(
        store.list_for_user(user.id).await.ok(),
        Some(vec!["task:write".to_owned()])
    );
}

#[tokio::test]
async fn classroom_list_sorts_with_id_tiebreak() {
    let store = InMemoryStore::new();
    seed_classrooms(&store, &["Biology", "algebra", "Biology", "Chemistry"]).await;

    let mut filters = Filters::new(CLASSROOM_SORT_SAFELIST);
    filters.sort = "-name".to_owned();
    let Ok(request) = filters.page_request() else {
        panic!("filters should validate");
    };
    let Ok(page) = ClassroomRepository::list(&store, "", &request).await else {
        panic!("list should succeed");
    };
    let ids = page
        .items
        .iter()
        .map(|classroom| classroom.id)
        .collect::<Vec<_>>();

    assert_eq!(ids, vec![2, 4, 1, 3]);
}

async fn classroom_pages(store: &InMemoryStore, sort: &str, page_size: i64) -> Vec<Page<Classroom>> {
    let mut pages = Vec::new();
    for page in 1..=4 {
        let filters = Filters {
            page,
            page_size,
            sort: sort.to_owned(),
            sort_safelist: CLASSROOM_SORT_SAFELIST,
        };
        let Ok(request) = filters.page_request() else {
            panic!("filters should validate");
        };
        let Ok(listed) = ClassroomRepository::list(store, "", &request).await else {
            panic!("list should succeed");
        };
        pages.push(listed);
    }
    pages
}

#[tokio::test]
async fn repeated_listing_returns_identical_pages_across_ties() {
    let store = InMemoryStore::new();
    seed_classrooms(&store, &["Lab", "Lab", "Lab", "Annex", "Lab"]).await;

    let first = classroom_pages(&store, "name", 2).await;
    let second = classroom_pages(&store, "name", 2).await;
    assert_eq!(first, second);

    let ids = first
        .iter()
        .flat_map(|page| page.items.iter().map(|classroom| classroom.id))
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![4, 1, 2, 3, 5]);
    assert!(first[3].items.is_empty());
    assert!(first.iter().all(|page| page.metadata.total_records == 5));
    assert!(first.iter().all(|page| page.metadata.last_page == 3));
}

#[tokio::test]
async fn classroom_list_matches_name_case_insensitively() {
    let store = InMemoryStore::new();
    seed_classrooms(&store, &["Biology", "biology", "Chemistry"]).await;

    let Ok(request) = Filters::new(CLASSROOM_SORT_SAFELIST).page_request() else {
        panic!("filters should validate");
    };
    let Ok(page) = ClassroomRepository::list(&store, "BIOLOGY", &request).await else {
        panic!("list should succeed");
    };

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.metadata.total_records, 2);
}

#[tokio::test]
async fn tasks_require_existing_classrooms_and_lose_deleted_ones() {
    let store = InMemoryStore::new();
    seed_classrooms(&store, &["Biology", "Chemistry"]).await;

    let orphan = TaskRepository::insert(
        &store,
        &TaskDraft {
            header: "Lab".to_owned(),
            description: String::new(),
            classroom_ids: vec![1, 9],
        },
    )
    .await;
    assert!(matches!(orphan, Err(AppError::InvalidFields(_))));

    let Ok(task) = TaskRepository::insert(
        &store,
        &TaskDraft {
            header: "Lab".to_owned(),
            description: String::new(),
            classroom_ids: vec![2, 1],
        },
    )
    .await
    else {
        panic!("insert should succeed");
    };
    assert_eq!(task.classroom_ids, vec![1, 2]);

    assert!(ClassroomRepository::delete(&store, 1).await.is_ok());
    let reloaded = TaskRepository::find_by_id(&store, task.id).await;
    assert_eq!(
        reloaded.ok().flatten().map(|task| task.classroom_ids),
        Some(vec![2])
    );
}

#[tokio::test]
async fn task_update_rejects_stale_versions() {
    let store = InMemoryStore::new();
    let Ok(task) = TaskRepository::insert(
        &store,
        &TaskDraft {
            header: "Essay".to_owned(),
            description: String::new(),
            classroom_ids: Vec::new(),
        },
    )
    .await
    else {
        panic!("insert should succeed");
    };

    let update = TaskUpdate {
        id: task.id,
        header: "Essay draft".to_owned(),
        description: String::new(),
        classroom_ids: None,
        expected_updated_at: task.updated_at,
    };
    assert!(TaskRepository::update(&store, &update).await.is_ok());
    assert!(matches!(
        TaskRepository::update(&store, &update).await,
        Err(AppError::Conflict(_))
    ));

    let Ok(request) = Filters::new(TASK_SORT_SAFELIST).page_request() else {
        panic!("filters should validate");
    };
    let listed = TaskRepository::list(&store, "essay DRAFT", &request).await;
    assert_eq!(listed.map(|page| page.items.len()).ok(), Some(1));
}
