use std::collections::BTreeSet;
use std::str::FromStr;

use classroom_core::AppError;
use serde::Serialize;

/// Permissions enforced by route gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Allows reading classrooms.
    ClassRead,
    /// Allows deleting classrooms.
    ClassWrite,
    /// Allows reading tasks.
    TaskRead,
    /// Allows creating, updating and deleting tasks.
    TaskWrite,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassRead => "class:read",
            Self::ClassWrite => "class:write",
            Self::TaskRead => "task:read",
            Self::TaskWrite => "task:write",
        }
    }

    /// Permissions granted to every newly registered user.
    #[must_use]
    pub fn registration_defaults() -> &'static [Self] {
        &[Permission::ClassRead]
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "class:read" => Ok(Self::ClassRead),
            "class:write" => Ok(Self::ClassWrite),
            "task:read" => Ok(Self::TaskRead),
            "task:write" => Ok(Self::TaskWrite),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Set of permission codes granted to one user.
///
/// Codes are kept as stored strings so grants unknown to this build are
/// tolerated rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Builds a set from stored permission codes.
    #[must_use]
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    /// Returns whether the permission is granted.
    #[must_use]
    pub fn includes(&self, permission: Permission) -> bool {
        self.0.contains(permission.as_str())
    }

    /// Returns whether no permission is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over granted codes in lexical order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
