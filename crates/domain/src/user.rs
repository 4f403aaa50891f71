//! User domain types and validation rules.

use chrono::{DateTime, Utc};
use classroom_core::Validator;
use serde::{Deserialize, Serialize};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a stored user id.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying database id.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Registered user as exposed to API callers.
///
/// The password hash is deliberately not part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Database id.
    pub id: UserId,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique, lower-cased email address.
    pub email: String,
    /// Whether the account has redeemed its activation token.
    pub activated: bool,
}

/// Minimum accepted password length in bytes.
pub const PASSWORD_MIN_BYTES: usize = 8;

/// Maximum accepted password length in bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Maximum length of first and last names in bytes.
pub const NAME_MAX_BYTES: usize = 500;

/// Maximum length of an email address in bytes.
pub const EMAIL_MAX_BYTES: usize = 254;

/// Normalizes an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Performs structural email validation: exactly one `@`, non-empty local
/// part, and a dotted domain made of non-empty labels.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_BYTES || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '-')
    })
}

/// Records email failures under the `email` field.
pub fn validate_email(validator: &mut Validator, email: &str) {
    validator.check(!email.is_empty(), "email", "must be provided");
    validator.check(is_valid_email(email), "email", "must be a valid email address");
}

/// Records plaintext password failures under the `password` field.
pub fn validate_password_plaintext(validator: &mut Validator, password: &str) {
    validator.check(!password.is_empty(), "password", "must be provided");
    validator.check(
        password.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    validator.check(
        password.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

/// Records name failures under `first_name` and `last_name`.
pub fn validate_user_names(validator: &mut Validator, first_name: &str, last_name: &str) {
    validator.check(!first_name.is_empty(), "first_name", "must be provided");
    validator.check(
        first_name.len() <= NAME_MAX_BYTES,
        "first_name",
        "must not be more than 500 bytes long",
    );
    validator.check(!last_name.is_empty(), "last_name", "must be provided");
    validator.check(
        last_name.len() <= NAME_MAX_BYTES,
        "last_name",
        "must not be more than 500 bytes long",
    );
}

#[cfg(test)]
mod tests {
    use classroom_core::Validator;

    use super::{is_valid_email, normalize_email, validate_email, validate_password_plaintext};

    #[test]
    fn seven_byte_password_is_too_short() {
        let mut validator = Validator::new();
        validate_password_plaintext(&mut validator, "1234567");

        assert_eq!(
            validator.errors().get("password"),
            Some("must be at least 8 bytes long")
        );
    }

    #[test]
    fn eight_byte_password_is_accepted() {
        let mut validator = Validator::new();
        validate_password_plaintext(&mut validator, "12345678");

        assert!(validator.valid());
    }

    #[test]
    fn empty_password_reports_missing_first() {
        let mut validator = Validator::new();
        validate_password_plaintext(&mut validator, "");

        assert_eq!(validator.errors().get("password"), Some("must be provided"));
    }

    #[test]
    fn email_structure_is_checked() {
        assert!(is_valid_email("alice@school.example"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("alice@@school.example"));
        assert!(!is_valid_email("@school.example"));
        assert!(!is_valid_email("alice@school..example"));
        assert!(!is_valid_email("ali ce@school.example"));
    }

    #[test]
    fn empty_email_reports_missing() {
        let mut validator = Validator::new();
        validate_email(&mut validator, "");

        assert_eq!(validator.errors().get("email"), Some("must be provided"));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@School.Example "), "alice@school.example");
    }
}
