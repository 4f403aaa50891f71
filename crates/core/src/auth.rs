use serde::{Deserialize, Serialize};

/// Authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    user_id: i64,
    email: String,
    activated: bool,
}

impl AuthenticatedUser {
    /// Creates an authenticated caller from persisted user data.
    #[must_use]
    pub fn new(user_id: i64, email: impl Into<String>, activated: bool) -> Self {
        Self {
            user_id,
            email: email.into(),
            activated,
        }
    }

    /// Returns the caller's user id.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the caller's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns whether the caller's account has been activated.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

/// Caller identity attached to every request by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No bearer token was presented.
    #[default]
    Anonymous,
    /// A valid authentication token was presented.
    Authenticated(AuthenticatedUser),
}

impl Identity {
    /// Returns whether no credentials were presented.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns the authenticated caller, if any.
    #[must_use]
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}
