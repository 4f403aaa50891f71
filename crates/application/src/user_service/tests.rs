use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_core::{AppError, AppResult, AuthenticatedUser};
use classroom_domain::{Permission, Token, TokenScope, User, UserId};
use tokio::sync::Mutex;

use crate::{PermissionRepository, PermissionService, TokenRepository, TokenService};

use super::{
    DUPLICATE_EMAIL, FOREIGN_ACCOUNT, INVALID_CREDENTIALS, NewUser, PasswordCredential,
    PasswordHasher, RegisterUser, TokenLifetimes, UpdateUser, UserRecord, UserRepository,
    UserService,
};

struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        match hash.strip_prefix("hashed:") {
            Some(expected) => Ok(expected == password),
            None => Err(AppError::Internal("malformed hash".to_owned())),
        }
    }
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    users: Vec<UserRecord>,
    tokens: Vec<(String, UserId, DateTime<Utc>, TokenScope)>,
    grants: HashMap<UserId, Vec<String>>,
    reject_token_inserts: bool,
}

#[derive(Default)]
struct FakeStore {
    state: Mutex<StoreState>,
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn insert(&self, user: &NewUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|record| record.user.email == user.email)
        {
            return Err(AppError::Duplicate {
                field: "email".to_owned(),
            });
        }

        state.next_id += 1;
        let stored = User {
            id: UserId::new(state.next_id),
            created_at: Utc::now(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            activated: false,
        };
        state.users.push(UserRecord {
            user: stored.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(stored)
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|record| record.user.id == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|record| record.user.email == email)
            .cloned())
    }

    async fn update(&self, record: &UserRecord) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|existing| {
            existing.user.id != record.user.id && existing.user.email == record.user.email
        }) {
            return Err(AppError::Duplicate {
                field: "email".to_owned(),
            });
        }

        let existing = state
            .users
            .iter_mut()
            .find(|existing| existing.user.id == record.user.id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        *existing = record.clone();
        Ok(record.user.clone())
    }

    async fn delete(&self, user_id: UserId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let before = state.users.len();
        state.users.retain(|record| record.user.id != user_id);
        if state.users.len() == before {
            return Err(AppError::NotFound("user not found".to_owned()));
        }
        state.tokens.retain(|token| token.1 != user_id);
        state.grants.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for FakeStore {
    async fn insert(&self, token: &Token) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.reject_token_inserts {
            return Err(AppError::Internal("token store unavailable".to_owned()));
        }
        state.tokens.push((
            token.hash.clone(),
            token.user_id,
            token.expiry,
            token.scope,
        ));
        Ok(())
    }

    async fn find_user_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        let owner = state
            .tokens
            .iter()
            .find(|(hash, _, expiry, token_scope)| {
                hash == token_hash && *token_scope == scope && *expiry > now
            })
            .map(|token| token.1);

        Ok(owner.and_then(|user_id| {
            state
                .users
                .iter()
                .find(|record| record.user.id == user_id)
                .map(|record| record.user.clone())
        }))
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: UserId) -> AppResult<()> {
        self.state
            .lock()
            .await
            .tokens
            .retain(|token| !(token.3 == scope && token.1 == user_id));
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for FakeStore {
    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let granted = state.grants.entry(user_id).or_default();
        for code in codes {
            if !granted.iter().any(|existing| existing == code) {
                granted.push((*code).to_owned());
            }
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .await
            .grants
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct Harness {
    store: Arc<FakeStore>,
    users: UserService,
    tokens: TokenService,
    permissions: PermissionService,
}

fn harness() -> Harness {
    let store = Arc::new(FakeStore::default());
    let tokens = TokenService::new(store.clone());
    let permissions = PermissionService::new(store.clone());
    let users = UserService::new(
        store.clone(),
        Arc::new(FakeHasher),
        tokens.clone(),
        permissions.clone(),
        TokenLifetimes::default(),
    );

    Harness {
        store,
        users,
        tokens,
        permissions,
    }
}

fn registration(email: &str, password: &str) -> RegisterUser {
    RegisterUser {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

fn caller_for(user: &User) -> AuthenticatedUser {
    AuthenticatedUser::new(user.id.as_i64(), user.email.clone(), user.activated)
}

#[tokio::test]
async fn short_password_is_rejected_before_storage() {
    let harness = harness();

    match harness
        .users
        .register(registration("ada@example.com", "1234567"))
        .await
    {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(
                errors.get("password"),
                Some("must be at least 8 bytes long")
            );
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
    assert!(harness.store.state.lock().await.users.is_empty());
}

#[tokio::test]
async fn registration_stores_hash_grants_defaults_and_issues_activation_token() {
    let harness = harness();

    let Ok(registration) = harness
        .users
        .register(registration("Ada@Example.com", "12345678"))
        .await
    else {
        panic!("registration should succeed");
    };

    assert!(!registration.user.activated);
    assert_eq!(registration.user.email, "ada@example.com");
    assert_eq!(registration.activation_token.plaintext.len(), 26);
    assert_eq!(registration.activation_token.scope, TokenScope::Activation);

    let stored = harness.store.state.lock().await.users[0].password_hash.clone();
    assert_ne!(stored, "12345678");

    let granted = harness
        .permissions
        .get_all_for_user(registration.user.id)
        .await;
    let Ok(granted) = granted else {
        panic!("permissions should load");
    };
    assert!(granted.includes(Permission::ClassRead));
    assert!(!granted.includes(Permission::TaskWrite));
}

#[tokio::test]
async fn failed_activation_token_rolls_back_the_new_user() {
    let harness = harness();
    harness.store.state.lock().await.reject_token_inserts = true;

    let registered = harness
        .users
        .register(registration("ada@example.com", "12345678"))
        .await;
    assert!(matches!(registered, Err(AppError::Internal(_))));
    {
        let state = harness.store.state.lock().await;
        assert!(state.users.is_empty());
        assert!(state.grants.is_empty());
    }

    harness.store.state.lock().await.reject_token_inserts = false;
    assert!(
        harness
            .users
            .register(registration("ada@example.com", "12345678"))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn duplicate_email_is_reported_on_the_email_field() {
    let harness = harness();
    assert!(
        harness
            .users
            .register(registration("ada@example.com", "12345678"))
            .await
            .is_ok()
    );

    match harness
        .users
        .register(registration("ADA@example.com", "87654321"))
        .await
    {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(errors.get("email"), Some(DUPLICATE_EMAIL));
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
}

#[tokio::test]
async fn activation_token_is_redeemable_once() {
    let harness = harness();
    let Ok(registration) = harness
        .users
        .register(registration("ada@example.com", "12345678"))
        .await
    else {
        panic!("registration should succeed");
    };
    let plaintext = registration.activation_token.plaintext;

    let activated = harness.users.activate(&plaintext).await;
    assert_eq!(activated.map(|user| user.activated).ok(), Some(true));

    match harness.users.activate(&plaintext).await {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(errors.get("token"), Some("invalid or expired activation token"));
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_activation_token_is_a_field_error() {
    let harness = harness();

    match harness.users.activate("short").await {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(errors.get("token"), Some("must be 26 bytes long"));
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
}

#[tokio::test]
async fn login_issues_authentication_token_for_matching_password() {
    let harness = harness();
    assert!(
        harness
            .users
            .register(registration("ada@example.com", "12345678"))
            .await
            .is_ok()
    );

    let Ok(token) = harness.users.login("ada@example.com", "12345678").await else {
        panic!("login should succeed");
    };
    assert_eq!(token.scope, TokenScope::Authentication);

    let owner = harness
        .tokens
        .user_for_token(TokenScope::Authentication, &token.plaintext)
        .await;
    assert_eq!(
        owner.map(|user| user.email).ok(),
        Some("ada@example.com".to_owned())
    );
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let harness = harness();
    assert!(
        harness
            .users
            .register(registration("ada@example.com", "12345678"))
            .await
            .is_ok()
    );

    for (email, password) in [
        ("ada@example.com", "wrong-password"),
        ("grace@example.com", "12345678"),
    ] {
        match harness.users.login(email, password).await {
            Err(AppError::Unauthorized(message)) => assert_eq!(message, INVALID_CREDENTIALS),
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn profile_is_limited_to_own_account() {
    let harness = harness();
    let Ok(registration) = harness
        .users
        .register(registration("ada@example.com", "12345678"))
        .await
    else {
        panic!("registration should succeed");
    };
    let caller = caller_for(&registration.user);

    let own = harness.users.get(&caller, registration.user.id).await;
    assert_eq!(own.map(|user| user.id).ok(), Some(registration.user.id));

    match harness.users.get(&caller, UserId::new(999)).await {
        Err(AppError::Forbidden(message)) => assert_eq!(message, FOREIGN_ACCOUNT),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn profile_update_changes_password_and_rejects_taken_email() {
    let harness = harness();
    let (Ok(ada), Ok(_grace)) = (
        harness
            .users
            .register(registration("ada@example.com", "12345678"))
            .await,
        harness
            .users
            .register(registration("grace@example.com", "12345678"))
            .await,
    ) else {
        panic!("registrations should succeed");
    };
    let caller = caller_for(&ada.user);

    let updated = harness
        .users
        .update_profile(
            &caller,
            ada.user.id,
            UpdateUser {
                last_name: Some("Byron".to_owned()),
                password: Some("new-password".to_owned()),
                ..UpdateUser::default()
            },
        )
        .await;
    assert_eq!(
        updated.map(|user| user.last_name).ok(),
        Some("Byron".to_owned())
    );
    assert!(
        harness
            .users
            .login("ada@example.com", "new-password")
            .await
            .is_ok()
    );

    let taken = harness
        .users
        .update_profile(
            &caller,
            ada.user.id,
            UpdateUser {
                email: Some("grace@example.com".to_owned()),
                ..UpdateUser::default()
            },
        )
        .await;
    match taken {
        Err(AppError::InvalidFields(errors)) => {
            assert_eq!(errors.get("email"), Some(DUPLICATE_EMAIL));
        }
        other => panic!("expected invalid fields, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_account_revokes_tokens() {
    let harness = harness();
    let Ok(registration) = harness
        .users
        .register(registration("ada@example.com", "12345678"))
        .await
    else {
        panic!("registration should succeed");
    };
    let Ok(token) = harness.users.login("ada@example.com", "12345678").await else {
        panic!("login should succeed");
    };
    let caller = caller_for(&registration.user);

    assert!(
        harness
            .users
            .delete(&caller, registration.user.id)
            .await
            .is_ok()
    );

    let owner = harness
        .tokens
        .user_for_token(TokenScope::Authentication, &token.plaintext)
        .await;
    assert!(matches!(owner, Err(AppError::NotFound(_))));
}

#[test]
fn credential_matches_only_the_plaintext_it_was_set_with() {
    let hasher = FakeHasher;
    let mut credential = PasswordCredential::default();

    assert_eq!(credential.matches(&hasher, "12345678").ok(), Some(false));
    assert!(credential.set(&hasher, "12345678").is_ok());
    assert_eq!(credential.plaintext(), Some("12345678"));
    assert_eq!(credential.matches(&hasher, "12345678").ok(), Some(true));
    assert_eq!(credential.matches(&hasher, "12345679").ok(), Some(false));
    assert!(!format!("{credential:?}").contains("12345678"));
}

#[test]
fn credential_propagates_hasher_failures() {
    let credential = PasswordCredential::from_hash("not-a-hash");

    assert!(matches!(
        credential.matches(&FakeHasher, "12345678"),
        Err(AppError::Internal(_))
    ));
}
