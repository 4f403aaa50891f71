use classroom_core::Validator;
use classroom_domain::{
    Permission, TokenScope, UserId, normalize_email, validate_email, validate_password_plaintext,
    validate_user_names,
};
use tracing::{info, warn};

use super::*;

impl UserService {
    /// Registers a new, not yet activated user.
    ///
    /// The user is granted the default permissions and an activation token is
    /// issued. A taken email address is reported as a field error on `email`.
    /// When either follow-up step fails the user row is removed again, so the
    /// email address stays available.
    pub async fn register(&self, params: RegisterUser) -> AppResult<Registration> {
        let email = normalize_email(&params.email);

        let mut validator = Validator::new();
        validate_user_names(&mut validator, &params.first_name, &params.last_name);
        validate_email(&mut validator, &email);
        validate_password_plaintext(&mut validator, &params.password);
        validator.finish()?;

        let mut credential = PasswordCredential::default();
        credential.set(self.password_hasher.as_ref(), &params.password)?;
        let password_hash = credential
            .hash()
            .ok_or_else(|| AppError::Internal("missing password hash for user".to_owned()))?
            .to_owned();

        let user = self
            .user_repository
            .insert(&NewUser {
                first_name: params.first_name,
                last_name: params.last_name,
                email,
                password_hash,
            })
            .await
            .map_err(duplicate_email_as_field_error)?;

        let activation_token = match self.grant_and_issue(user.id).await {
            Ok(activation_token) => activation_token,
            Err(error) => {
                if let Err(cleanup) = self.user_repository.delete(user.id).await {
                    warn!(
                        user_id = %user.id,
                        error = %cleanup,
                        "failed to remove partial registration"
                    );
                }
                return Err(error);
            }
        };

        info!(user_id = %user.id, "registered user");

        Ok(Registration {
            user,
            activation_token,
        })
    }

    async fn grant_and_issue(&self, user_id: UserId) -> AppResult<Token> {
        self.permission_service
            .add_for_user(user_id, Permission::registration_defaults())
            .await?;

        self.token_service
            .new_token(
                user_id,
                self.token_lifetimes.activation,
                TokenScope::Activation,
            )
            .await
    }
}
