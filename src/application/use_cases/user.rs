use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        use_cases::auth::{
            Notifier, ProfileUpdate, PublicUser, UserRepo, generate_verification_code,
        },
        validators::{is_valid_email, non_blank, normalize_email},
    },
};

#[derive(Clone)]
pub struct UserUseCases {
    users: Arc<dyn UserRepo>,
    notifier: Arc<dyn Notifier>,
    verification_code_ttl: Duration,
}

impl UserUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        notifier: Arc<dyn Notifier>,
        verification_code_ttl: Duration,
    ) -> Self {
        Self {
            users,
            notifier,
            verification_code_ttl,
        }
    }

    /// Applies the provided fields. Once country and target language are both
    /// set the welcome email goes out; a send failure fails the call.
    #[instrument(skip(self, update))]
    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<PublicUser> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if !user.email_verified {
            return Err(AppError::Forbidden("Email not verified".into()));
        }

        let update = ProfileUpdate {
            phone_number: trimmed(update.phone_number),
            age_range: trimmed(update.age_range),
            gender: trimmed(update.gender).map(|g| g.to_uppercase()),
            country: trimmed(update.country),
            target_language: trimmed(update.target_language),
            reason_for_learning: trimmed(update.reason_for_learning),
        };

        let updated = self.users.update_profile(user_id, update).await?;

        if updated.is_profile_complete() {
            self.notifier
                .send_welcome_email(&updated.email, &updated.first_name)
                .await?;
        }

        Ok(PublicUser::from(&updated))
    }

    /// Moves a not-yet-verified account to another address and sends a fresh
    /// code there.
    #[instrument(skip(self))]
    pub async fn change_email(&self, old_email: &str, new_email: &str) -> AppResult<()> {
        let Some(old_email) = non_blank(Some(old_email)).map(normalize_email) else {
            return Err(AppError::InvalidInput("Old email is required.".into()));
        };
        let Some(new_email) = non_blank(Some(new_email)).map(normalize_email) else {
            return Err(AppError::InvalidInput("New email is required.".into()));
        };
        if !is_valid_email(&new_email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }

        let user = self
            .users
            .find_by_email(&old_email)
            .await?
            .ok_or_else(|| AppError::NotFound("Old email not found".into()))?;
        if user.email_verified {
            return Err(AppError::InvalidState("Email already verified".into()));
        }
        if self.users.find_by_email(&new_email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists.".into(),
            ));
        }

        let code = generate_verification_code();
        let expires_at = Utc::now().naive_utc() + self.verification_code_ttl;
        let updated = self
            .users
            .change_email(user.id, &new_email, &code, expires_at)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => {
                    AppError::Conflict("An account with this email already exists.".into())
                }
                other => other,
            })?;

        self.notifier
            .send_verification_code(&updated.email, &updated.first_name, &code)
            .await
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
