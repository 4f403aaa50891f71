use std::fmt;

use classroom_core::AppResult;

use super::PasswordHasher;

/// Password of one user.
///
/// Holds the one-way hash, and for the duration of a request that sets a new
/// password, the plaintext it was derived from so validation can report on it.
#[derive(Clone, Default)]
pub struct PasswordCredential {
    plaintext: Option<String>,
    hash: Option<String>,
}

impl PasswordCredential {
    /// Wraps a stored hash.
    #[must_use]
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            plaintext: None,
            hash: Some(hash.into()),
        }
    }

    /// Hashes `plaintext` and keeps both values.
    pub fn set(&mut self, hasher: &dyn PasswordHasher, plaintext: &str) -> AppResult<()> {
        let hash = hasher.hash_password(plaintext)?;
        self.plaintext = Some(plaintext.to_owned());
        self.hash = Some(hash);

        Ok(())
    }

    /// Returns whether `plaintext` matches the stored hash.
    ///
    /// A credential without a hash never matches.
    pub fn matches(&self, hasher: &dyn PasswordHasher, plaintext: &str) -> AppResult<bool> {
        match &self.hash {
            Some(hash) => hasher.verify_password(plaintext, hash),
            None => Ok(false),
        }
    }

    /// Returns the plaintext set during this request, if any.
    #[must_use]
    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }

    /// Returns the stored hash, if any.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PasswordCredential")
            .field("plaintext", &self.plaintext.as_ref().map(|_| "[redacted]"))
            .field("hash", &self.hash.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
