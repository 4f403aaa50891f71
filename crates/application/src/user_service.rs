//! User management ports and application service.
//!
//! Owns the account lifecycle: registration with an activation token,
//! activation, password login issuing bearer tokens, and self-service
//! profile reads, updates and deletion.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use classroom_core::{AppError, AppResult};
use classroom_domain::{Token, User, UserId};

use crate::{PermissionService, TokenService};

mod activation;
mod credential;
mod login;
mod profile;
mod registration;

pub use credential::PasswordCredential;
pub use login::INVALID_CREDENTIALS;
pub use profile::FOREIGN_ACCOUNT;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Stored user together with its password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Public user fields.
    pub user: User,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Values for a user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Normalized email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with its assigned id. The new user is not
    /// activated. Returns `Duplicate { field: "email" }` when the email is taken.
    async fn insert(&self, user: &NewUser) -> AppResult<User>;

    /// Finds a user by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Writes every mutable field of the record. Returns `NotFound` when the
    /// user no longer exists and `Duplicate { field: "email" }` when the new
    /// email is taken.
    async fn update(&self, record: &UserRecord) -> AppResult<User>;

    /// Deletes a user together with its tokens and permission grants.
    async fn delete(&self, user_id: UserId) -> AppResult<()>;
}

/// Port for password hashing operations. Keeps the application layer free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash. A mismatch is
    /// `Ok(false)`; only malformed hashes or hasher failures are errors.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for user registration.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, normalized before storage.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The stored, not yet activated user.
    pub user: User,
    /// One-time activation token; its plaintext is not stored anywhere.
    pub activation_token: Token,
}

/// Lifetimes of issued tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    /// Lifetime of activation tokens.
    pub activation: Duration,
    /// Lifetime of authentication tokens.
    pub authentication: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            activation: Duration::hours(72),
            authentication: Duration::hours(24),
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for user accounts.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: TokenService,
    permission_service: PermissionService,
    token_lifetimes: TokenLifetimes,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: TokenService,
        permission_service: PermissionService,
        token_lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_service,
            permission_service,
            token_lifetimes,
        }
    }

    async fn require_record(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }
}

/// Message recorded under `email` when the address is already registered.
pub const DUPLICATE_EMAIL: &str = "a user with this email address already exists";

fn duplicate_email_as_field_error(error: AppError) -> AppError {
    match error {
        AppError::Duplicate { field } if field == "email" => {
            let mut validator = classroom_core::Validator::new();
            validator.add_error("email", DUPLICATE_EMAIL);
            AppError::InvalidFields(validator.into_errors())
        }
        other => other,
    }
}
