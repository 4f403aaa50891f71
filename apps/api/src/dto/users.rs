use classroom_application::{RegisterUser, Registration, UpdateUser};
use classroom_domain::{Token, User};
use serde::{Deserialize, Serialize};

/// Incoming payload for user registration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<RegisterUserRequest> for RegisterUser {
    fn from(value: RegisterUserRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            password: value.password,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivateUserRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Incoming payload for a partial profile update.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            password: value.password,
        }
    }
}

/// Freshly registered user together with its one-time activation token.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub user: RegisteredUser,
}

impl From<Registration> for RegistrationResponse {
    fn from(value: Registration) -> Self {
        Self {
            user: RegisteredUser {
                token: value.activation_token.plaintext,
                user: value.user,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AuthenticationTokenResponse {
    pub authentication_token: Token,
}
