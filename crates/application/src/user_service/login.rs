use classroom_core::Validator;
use classroom_domain::{
    TokenScope, normalize_email, validate_email, validate_password_plaintext,
};
use tracing::{debug, info};

use super::*;

/// Message returned for any login failure so the response does not reveal
/// whether the email address is registered.
pub const INVALID_CREDENTIALS: &str = "invalid authentication credentials";

impl UserService {
    /// Authenticates with email and password and issues an authentication
    /// token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Token> {
        let email = normalize_email(email);

        let mut validator = Validator::new();
        validate_email(&mut validator, &email);
        validate_password_plaintext(&mut validator, password);
        validator.finish()?;

        let Some(record) = self.user_repository.find_by_email(&email).await? else {
            // Hash anyway so unknown addresses cost the same as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            debug!("login rejected for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        let credential = PasswordCredential::from_hash(record.password_hash);
        if !credential.matches(self.password_hasher.as_ref(), password)? {
            debug!(user_id = %record.user.id, "login rejected for wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let token = self
            .token_service
            .new_token(
                record.user.id,
                self.token_lifetimes.authentication,
                TokenScope::Authentication,
            )
            .await?;

        info!(user_id = %record.user.id, "user logged in");
        Ok(token)
    }
}
