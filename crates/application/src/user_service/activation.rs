use classroom_core::Validator;
use classroom_domain::{TokenScope, validate_token_plaintext};
use tracing::info;

use super::*;

impl UserService {
    /// Activates the account owning an activation token.
    ///
    /// Every activation token of the user is deleted afterwards, so a token
    /// can be redeemed once.
    pub async fn activate(&self, token_plaintext: &str) -> AppResult<User> {
        let mut validator = Validator::new();
        validate_token_plaintext(&mut validator, token_plaintext);
        validator.finish()?;

        let user = match self
            .token_service
            .user_for_token(TokenScope::Activation, token_plaintext)
            .await
        {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                let mut validator = Validator::new();
                validator.add_error("token", "invalid or expired activation token");
                return Err(AppError::InvalidFields(validator.into_errors()));
            }
            Err(error) => return Err(error),
        };

        let mut record = self.require_record(user.id).await?;
        record.user.activated = true;
        let activated = self.user_repository.update(&record).await?;

        self.token_service
            .delete_all_for_user(TokenScope::Activation, activated.id)
            .await?;

        info!(user_id = %activated.id, "activated user");
        Ok(activated)
    }
}
