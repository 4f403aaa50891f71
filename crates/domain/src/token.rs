use chrono::{DateTime, Utc};
use classroom_core::Validator;
use serde::Serialize;

use crate::UserId;

/// Length of a base32-encoded token plaintext (16 random bytes, unpadded).
pub const TOKEN_PLAINTEXT_LENGTH: usize = 26;

/// Use case a token is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Redeemed once to activate a freshly registered account.
    Activation,
    /// Presented as a bearer credential on API requests.
    Authentication,
}

impl TokenScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

/// Freshly issued token.
///
/// Only `plaintext` and `expiry` are serialized; the plaintext is never
/// persisted and cannot be recovered after this value is dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    /// Opaque value handed to the caller.
    #[serde(rename = "token")]
    pub plaintext: String,
    /// Hex SHA-256 digest of the plaintext, used as the lookup key.
    #[serde(skip)]
    pub hash: String,
    /// Owning user.
    #[serde(skip)]
    pub user_id: UserId,
    /// Instant after which the token no longer resolves.
    pub expiry: DateTime<Utc>,
    /// Use case the token is valid for.
    #[serde(skip)]
    pub scope: TokenScope,
}

/// Records failures for a presented token plaintext under the `token` field.
pub fn validate_token_plaintext(validator: &mut Validator, plaintext: &str) {
    validator.check(!plaintext.is_empty(), "token", "must be provided");
    validator.check(
        plaintext.len() == TOKEN_PLAINTEXT_LENGTH,
        "token",
        "must be 26 bytes long",
    );
}
