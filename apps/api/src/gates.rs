//! Route gates expressed as extractors. A handler that takes a gate never
//! runs unless the gate accepted the caller.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classroom_core::{AppError, AuthenticatedUser, Identity};
use classroom_domain::Permission;

use crate::error::ApiError;
use crate::state::AppState;

pub const AUTHENTICATION_REQUIRED: &str = "you must be authenticated to access this resource";
pub const ACTIVATION_REQUIRED: &str =
    "your user account must be activated to access this resource";

/// Authenticated caller whose account is activated.
#[derive(Debug, Clone)]
pub struct ActivatedUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for ActivatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_default();

        require_activated(identity).map(Self).map_err(ApiError)
    }
}

fn require_activated(identity: Identity) -> Result<AuthenticatedUser, AppError> {
    match identity {
        Identity::Anonymous => Err(AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_owned())),
        Identity::Authenticated(user) if !user.is_activated() => {
            Err(AppError::Forbidden(ACTIVATION_REQUIRED.to_owned()))
        }
        Identity::Authenticated(user) => Ok(user),
    }
}

/// Permission a [`Permitted`] gate demands.
pub trait RequiredPermission {
    const PERMISSION: Permission;
}

pub struct ClassWrite;

impl RequiredPermission for ClassWrite {
    const PERMISSION: Permission = Permission::ClassWrite;
}

pub struct TaskRead;

impl RequiredPermission for TaskRead {
    const PERMISSION: Permission = Permission::TaskRead;
}

pub struct TaskWrite;

impl RequiredPermission for TaskWrite {
    const PERMISSION: Permission = Permission::TaskWrite;
}

/// Activated caller holding the permission named by `P`.
pub struct Permitted<P> {
    pub user: AuthenticatedUser,
    _permission: PhantomData<fn() -> P>,
}

impl<P> FromRequestParts<AppState> for Permitted<P>
where
    P: RequiredPermission,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ActivatedUser(user) = ActivatedUser::from_request_parts(parts, state).await?;
        state
            .permission_service
            .require_permission(&user, P::PERMISSION)
            .await?;

        Ok(Self {
            user,
            _permission: PhantomData,
        })
    }
}
