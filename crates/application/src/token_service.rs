//! Bearer token issuance and lookup.
//!
//! Tokens are cryptographically random, stored only as SHA-256 hashes, scoped
//! to one use case and time-limited.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use classroom_core::{AppError, AppResult, AuthenticatedUser, Identity, Validator};
use classroom_domain::{Token, TokenScope, User, UserId, validate_token_plaintext};

mod token_crypto;

pub(crate) use token_crypto::{generate_plaintext, hash_token};


/// Repository port for token persistence.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Stores the hash, owner, scope and expiry of a freshly issued token.
    async fn insert(&self, token: &Token) -> AppResult<()>;

    /// Finds the user owning an unexpired token with the given hash and scope.
    async fn find_user_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Removes every token of a scope owned by a user.
    async fn delete_all_for_user(&self, scope: TokenScope, user_id: UserId) -> AppResult<()>;
}

/// Message used for every bearer token failure so callers cannot tell an
/// expired token from an unknown one.
pub const INVALID_AUTHENTICATION_TOKEN: &str = "invalid or missing authentication token";

/// Application service issuing and resolving scoped tokens.
#[derive(Clone)]
pub struct TokenService {
    repository: Arc<dyn TokenRepository>,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(repository: Arc<dyn TokenRepository>) -> Self {
        Self { repository }
    }

    /// Issues and persists a token for `user_id`.
    ///
    /// The returned plaintext is the only copy; it cannot be recovered later.
    pub async fn new_token(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
    ) -> AppResult<Token> {
        let expiry = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal(format!("token lifetime {ttl} is out of range")))?;
        let plaintext = generate_plaintext()?;
        let token = Token {
            hash: hash_token(&plaintext),
            plaintext,
            user_id,
            expiry,
            scope,
        };

        self.repository.insert(&token).await?;
        debug!(user_id = %user_id, scope = scope.as_str(), "issued token");

        Ok(token)
    }

    /// Resolves the owner of an unexpired token.
    ///
    /// Expired, wrongly scoped and unknown tokens all yield `NotFound`.
    pub async fn user_for_token(&self, scope: TokenScope, plaintext: &str) -> AppResult<User> {
        let token_hash = hash_token(plaintext);

        self.repository
            .find_user_for_token(scope, &token_hash, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("token not found".to_owned()))
    }

    /// Deletes every token of `scope` owned by `user_id`.
    pub async fn delete_all_for_user(&self, scope: TokenScope, user_id: UserId) -> AppResult<()> {
        self.repository.delete_all_for_user(scope, user_id).await
    }

    /// Resolves the caller identity for an optional bearer token.
    ///
    /// No token yields an anonymous identity. A malformed, expired or unknown
    /// token yields `Unauthorized` with one shared message.
    pub async fn resolve_identity(&self, bearer_token: Option<&str>) -> AppResult<Identity> {
        let Some(plaintext) = bearer_token else {
            return Ok(Identity::Anonymous);
        };

        let mut validator = Validator::new();
        validate_token_plaintext(&mut validator, plaintext);
        if !validator.valid() {
            return Err(AppError::Unauthorized(
                INVALID_AUTHENTICATION_TOKEN.to_owned(),
            ));
        }

        match self
            .user_for_token(TokenScope::Authentication, plaintext)
            .await
        {
            Ok(user) => Ok(Identity::Authenticated(AuthenticatedUser::new(
                user.id.as_i64(),
                user.email,
                user.activated,
            ))),
            Err(AppError::NotFound(_)) => Err(AppError::Unauthorized(
                INVALID_AUTHENTICATION_TOKEN.to_owned(),
            )),
            Err(error) => Err(error),
        }
    }
}
