//! In-memory implementation of every store port.
//!
//! Mirrors the PostgreSQL schema closely enough to drive the HTTP layer in
//! tests and local runs without a database: unique emails, cascading deletes,
//! classroom references and optimistic task versions all behave the same.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use classroom_application::{
    ClassroomRepository, EDIT_CONFLICT, NewUser, PermissionRepository, TaskRepository,
    TaskUpdate, TokenRepository, UserRecord, UserRepository,
};
use classroom_core::{AppError, AppResult};
use classroom_domain::{
    Classroom, ClassroomDraft, Metadata, Page, PageRequest, Permission, SortDirection, Task,
    TaskDraft, Token, TokenScope, User, UserId, unknown_classrooms_error,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct StoredToken {
    user_id: UserId,
    expiry: DateTime<Utc>,
    scope: TokenScope,
}

#[derive(Debug, Default)]
struct StoreState {
    last_user_id: i64,
    last_classroom_id: i64,
    last_task_id: i64,
    users: BTreeMap<i64, UserRecord>,
    tokens: BTreeMap<String, StoredToken>,
    grants: BTreeMap<i64, BTreeSet<String>>,
    classrooms: BTreeMap<i64, Classroom>,
    tasks: BTreeMap<i64, Task>,
}

impl StoreState {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|record| record.user.email == email && Some(record.user.id.as_i64()) != except)
    }

    fn check_classrooms(&self, classroom_ids: &[i64]) -> AppResult<Vec<i64>> {
        if classroom_ids
            .iter()
            .any(|id| !self.classrooms.contains_key(id))
        {
            return Err(unknown_classrooms_error());
        }

        let mut sorted = classroom_ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Ok(sorted)
    }
}

/// Store keeping every record in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts and slices `matched`, which must arrive in ascending id order. The
/// sort is stable, so equal keys stay ascending by id in both directions.
fn paginate<T: Clone>(
    mut matched: Vec<T>,
    page: &PageRequest,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Page<T> {
    let direction = page.sort().direction();
    matched.sort_by(|left, right| {
        let ordering = compare(left, right);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total_records = matched.len() as u64;
    let items = matched
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(0))
        .collect();

    Page {
        items,
        metadata: Metadata::calculate(total_records, page),
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(AppError::Duplicate {
                field: "email".to_owned(),
            });
        }

        state.last_user_id += 1;
        let stored = User {
            id: UserId::new(state.last_user_id),
            created_at: Utc::now(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            activated: false,
        };
        let user_id = state.last_user_id;
        state.users.insert(
            user_id,
            UserRecord {
                user: stored.clone(),
                password_hash: user.password_hash.clone(),
            },
        );

        Ok(stored)
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&user_id.as_i64())
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|record| record.user.email == email)
            .cloned())
    }

    async fn update(&self, record: &UserRecord) -> AppResult<User> {
        let mut state = self.state.write().await;
        let user_id = record.user.id.as_i64();
        if state.email_taken(&record.user.email, Some(user_id)) {
            return Err(AppError::Duplicate {
                field: "email".to_owned(),
            });
        }

        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;
        stored.user.first_name = record.user.first_name.clone();
        stored.user.last_name = record.user.last_name.clone();
        stored.user.email = record.user.email.clone();
        stored.user.activated = record.user.activated;
        stored.password_hash = record.password_hash.clone();

        Ok(stored.user.clone())
    }

    async fn delete(&self, user_id: UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.users.remove(&user_id.as_i64()).is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        state.tokens.retain(|_, token| token.user_id != user_id);
        state.grants.remove(&user_id.as_i64());
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert(&self, token: &Token) -> AppResult<()> {
        self.state.write().await.tokens.insert(
            token.hash.clone(),
            StoredToken {
                user_id: token.user_id,
                expiry: token.expiry,
                scope: token.scope,
            },
        );
        Ok(())
    }

    async fn find_user_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let state = self.state.read().await;

        Ok(state
            .tokens
            .get(token_hash)
            .filter(|token| token.scope == scope && token.expiry > now)
            .and_then(|token| state.users.get(&token.user_id.as_i64()))
            .map(|record| record.user.clone()))
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: UserId) -> AppResult<()> {
        self.state
            .write()
            .await
            .tokens
            .retain(|_, token| !(token.scope == scope && token.user_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryStore {
    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AppResult<()> {
        let mut state = self.state.write().await;
        let granted = state.grants.entry(user_id.as_i64()).or_default();
        for code in codes {
            if code.parse::<Permission>().is_ok() {
                granted.insert((*code).to_owned());
            }
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .read()
            .await
            .grants
            .get(&user_id.as_i64())
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ClassroomRepository for InMemoryStore {
    async fn insert(&self, draft: &ClassroomDraft) -> AppResult<Classroom> {
        let mut state = self.state.write().await;
        state.last_classroom_id += 1;
        let classroom = Classroom {
            id: state.last_classroom_id,
            created_at: Utc::now(),
            name: draft.name.clone(),
            description: draft.description.clone(),
        };
        state.classrooms.insert(classroom.id, classroom.clone());

        Ok(classroom)
    }

    async fn find_by_id(&self, classroom_id: i64) -> AppResult<Option<Classroom>> {
        Ok(self
            .state
            .read()
            .await
            .classrooms
            .get(&classroom_id)
            .cloned())
    }

    async fn list(&self, name: &str, page: &PageRequest) -> AppResult<Page<Classroom>> {
        let matched = self
            .state
            .read()
            .await
            .classrooms
            .values()
            .filter(|classroom| {
                name.is_empty() || classroom.name.to_lowercase() == name.to_lowercase()
            })
            .cloned()
            .collect::<Vec<_>>();

        let column = page.sort().column();
        Ok(paginate(matched, page, |left, right| match column {
            "name" => left.name.cmp(&right.name),
            "created_at" => left.created_at.cmp(&right.created_at),
            _ => left.id.cmp(&right.id),
        }))
    }

    async fn update(&self, classroom: &Classroom) -> AppResult<Classroom> {
        let mut state = self.state.write().await;
        let stored = state.classrooms.get_mut(&classroom.id).ok_or_else(|| {
            AppError::NotFound(format!("classroom '{}' not found", classroom.id))
        })?;
        stored.name = classroom.name.clone();
        stored.description = classroom.description.clone();

        Ok(stored.clone())
    }

    async fn delete(&self, classroom_id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.classrooms.remove(&classroom_id).is_none() {
            return Err(AppError::NotFound(format!(
                "classroom '{classroom_id}' not found"
            )));
        }

        for task in state.tasks.values_mut() {
            task.classroom_ids.retain(|id| *id != classroom_id);
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn insert(&self, draft: &TaskDraft) -> AppResult<Task> {
        let mut state = self.state.write().await;
        let classroom_ids = state.check_classrooms(&draft.classroom_ids)?;

        state.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.last_task_id,
            header: draft.header.clone(),
            description: draft.description.clone(),
            created_at: now,
            updated_at: now,
            classroom_ids,
        };
        state.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_by_id(&self, task_id: i64) -> AppResult<Option<Task>> {
        Ok(self.state.read().await.tasks.get(&task_id).cloned())
    }

    async fn list(&self, header: &str, page: &PageRequest) -> AppResult<Page<Task>> {
        let matched = self
            .state
            .read()
            .await
            .tasks
            .values()
            .filter(|task| header.is_empty() || task.header.to_lowercase() == header.to_lowercase())
            .cloned()
            .collect::<Vec<_>>();

        let column = page.sort().column();
        Ok(paginate(matched, page, |left, right| match column {
            "header" => left.header.cmp(&right.header),
            "created_at" => left.created_at.cmp(&right.created_at),
            "updated_at" => left.updated_at.cmp(&right.updated_at),
            _ => left.id.cmp(&right.id),
        }))
    }

    async fn update(&self, update: &TaskUpdate) -> AppResult<Task> {
        let mut state = self.state.write().await;
        let classroom_ids = match &update.classroom_ids {
            Some(classroom_ids) => Some(state.check_classrooms(classroom_ids)?),
            None => None,
        };

        let task = state
            .tasks
            .get_mut(&update.id)
            .ok_or_else(|| AppError::NotFound(format!("task '{}' not found", update.id)))?;
        if task.updated_at != update.expected_updated_at {
            return Err(AppError::Conflict(EDIT_CONFLICT.to_owned()));
        }

        task.header = update.header.clone();
        task.description = update.description.clone();
        if let Some(classroom_ids) = classroom_ids {
            task.classroom_ids = classroom_ids;
        }
        task.updated_at = Utc::now().max(task.updated_at + Duration::microseconds(1));

        Ok(task.clone())
    }

    async fn delete(&self, task_id: i64) -> AppResult<()> {
        if self.state.write().await.tasks.remove(&task_id).is_none() {
            return Err(AppError::NotFound(format!("task '{task_id}' not found")));
        }
        Ok(())
    }
}
