use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use classroom_core::{AppError, AppResult, AuthenticatedUser};
use classroom_domain::{Permission, PermissionSet, UserId};

/// Message returned when a caller lacks a required permission.
pub const MISSING_PERMISSION: &str =
    "your user account doesn't have the necessary permissions to access this resource";

/// Repository port for permission grants.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Grants permission codes to a user. Codes already granted are ignored.
    async fn add_for_user(&self, user_id: UserId, codes: &[&str]) -> AppResult<()>;

    /// Lists permission codes granted to a user.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>>;
}

/// Application service for permission grants and checks.
#[derive(Clone)]
pub struct PermissionService {
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    /// Creates a new permission service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self { repository }
    }

    /// Grants permissions to a user.
    pub async fn add_for_user(&self, user_id: UserId, permissions: &[Permission]) -> AppResult<()> {
        let codes = permissions
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>();

        self.repository.add_for_user(user_id, &codes).await
    }

    /// Returns every permission granted to a user.
    pub async fn get_all_for_user(&self, user_id: UserId) -> AppResult<PermissionSet> {
        let codes = self.repository.list_for_user(user_id).await?;

        Ok(PermissionSet::from_codes(codes))
    }

    /// Ensures the caller holds `permission`.
    pub async fn require_permission(
        &self,
        user: &AuthenticatedUser,
        permission: Permission,
    ) -> AppResult<()> {
        let granted = self
            .get_all_for_user(UserId::new(user.user_id()))
            .await?;

        if granted.includes(permission) {
            return Ok(());
        }

        debug!(
            user_id = user.user_id(),
            permission = permission.as_str(),
            "permission denied"
        );
        Err(AppError::Forbidden(MISSING_PERMISSION.to_owned()))
    }
}
