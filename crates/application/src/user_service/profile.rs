use classroom_core::{AuthenticatedUser, Validator};
use classroom_domain::{
    normalize_email, validate_email, validate_password_plaintext, validate_user_names,
};
use tracing::info;

use super::*;

/// Message returned when a caller addresses another user's account.
pub const FOREIGN_ACCOUNT: &str = "you can only access your own user account";

impl UserService {
    /// Returns the caller's own account.
    pub async fn get(&self, caller: &AuthenticatedUser, user_id: UserId) -> AppResult<User> {
        ensure_own_account(caller, user_id)?;

        Ok(self.require_record(user_id).await?.user)
    }

    /// Applies a partial update to the caller's own account.
    ///
    /// Last write wins; a taken email address is reported on `email`.
    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        user_id: UserId,
        changes: UpdateUser,
    ) -> AppResult<User> {
        ensure_own_account(caller, user_id)?;
        let mut record = self.require_record(user_id).await?;

        if let Some(first_name) = changes.first_name {
            record.user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            record.user.last_name = last_name;
        }
        if let Some(email) = changes.email {
            record.user.email = normalize_email(&email);
        }

        let mut validator = Validator::new();
        validate_user_names(
            &mut validator,
            &record.user.first_name,
            &record.user.last_name,
        );
        validate_email(&mut validator, &record.user.email);
        if let Some(password) = &changes.password {
            validate_password_plaintext(&mut validator, password);
        }
        validator.finish()?;

        if let Some(password) = &changes.password {
            let mut credential = PasswordCredential::default();
            credential.set(self.password_hasher.as_ref(), password)?;
            if let Some(hash) = credential.hash() {
                record.password_hash = hash.to_owned();
            }
        }

        let user = self
            .user_repository
            .update(&record)
            .await
            .map_err(duplicate_email_as_field_error)?;

        info!(user_id = %user.id, "updated user");
        Ok(user)
    }

    /// Deletes the caller's own account.
    pub async fn delete(&self, caller: &AuthenticatedUser, user_id: UserId) -> AppResult<()> {
        ensure_own_account(caller, user_id)?;
        self.user_repository.delete(user_id).await?;

        info!(user_id = %user_id, "deleted user");
        Ok(())
    }
}

fn ensure_own_account(caller: &AuthenticatedUser, user_id: UserId) -> AppResult<()> {
    if caller.user_id() == user_id.as_i64() {
        Ok(())
    } else {
        Err(AppError::Forbidden(FOREIGN_ACCOUNT.to_owned()))
    }
}
