use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        jwt::{TokenIssuer, TokenPair},
        use_cases::plans::{PlanRepo, UpsertUserPlan, UserPlanRepo},
        validators::{is_valid_email, is_valid_password, non_blank, normalize_email, MIN_PASSWORD_LEN},
    },
    domain::entities::{subscription_window::SubscriptionWindow, user_role::UserRole},
};

pub const VERIFICATION_CODE_LEN: usize = 6;

// ============================================================================
// Profiles
// ============================================================================

/// User row as the store sees it. Never serialized; see [`PublicUser`].
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub verification_code: Option<String>,
    pub verification_code_expires: Option<NaiveDateTime>,
    pub phone_number: Option<String>,
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub target_language: Option<String>,
    pub reason_for_learning: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl UserProfile {
    pub fn is_profile_complete(&self) -> bool {
        self.country.is_some() && self.target_language.is_some()
    }
}

/// Sanitized user: no password hash, no verification code or expiry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub phone_number: Option<String>,
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub target_language: Option<String>,
    pub reason_for_learning: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<&UserProfile> for PublicUser {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            email_verified: user.email_verified,
            phone_number: user.phone_number.clone(),
            age_range: user.age_range.clone(),
            gender: user.gender.clone(),
            country: user.country.clone(),
            target_language: user.target_language.clone(),
            reason_for_learning: user.reason_for_learning.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub verification_code: String,
    pub verification_code_expires: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct PasswordResetRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: NaiveDateTime,
}

/// Result of a successful verification or login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PublicUser,
}

// ============================================================================
// Repository and Collaborator Traits
// ============================================================================

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    /// Fails with `Conflict` when the email is already taken.
    async fn create(&self, input: NewUser) -> AppResult<UserProfile>;
    async fn set_verification_code(
        &self,
        user_id: Uuid,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()>;
    /// Sets `email_verified` and clears the code and its expiry. Returns
    /// `None` when the user was already verified.
    async fn mark_verified(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()>;
    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile>;
    /// Fails with `Conflict` when `new_email` is already taken.
    async fn change_email(
        &self,
        user_id: Uuid,
        new_email: &str,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<UserProfile>;
}

/// Optional profile fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub phone_number: Option<String>,
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub target_language: Option<String>,
    pub reason_for_learning: Option<String>,
}

#[async_trait]
pub trait RefreshTokenRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, token_hash: &str) -> AppResult<()>;
    async fn find(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;
    /// Returns whether a row was actually deleted.
    async fn delete(&self, token_hash: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait PasswordResetTokenRepo: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()>;
    async fn find(&self, token_hash: &str) -> AppResult<Option<PasswordResetRecord>>;
    /// Returns whether a row was actually deleted.
    async fn delete(&self, token_hash: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_code(&self, email: &str, name: &str, code: &str) -> AppResult<()>;
    async fn send_welcome_email(&self, email: &str, name: &str) -> AppResult<()>;
    async fn send_reset_link(&self, email: &str, link: &str) -> AppResult<()>;
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> AppResult<String>;
    async fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Base URL of the web client, without trailing slash.
    pub frontend_url: String,
    pub verification_code_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub free_plan_title: String,
}

#[derive(Clone)]
pub struct AuthUseCases {
    users: Arc<dyn UserRepo>,
    refresh_tokens: Arc<dyn RefreshTokenRepo>,
    reset_tokens: Arc<dyn PasswordResetTokenRepo>,
    plans: Arc<dyn PlanRepo>,
    user_plans: Arc<dyn UserPlanRepo>,
    notifier: Arc<dyn Notifier>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    settings: AuthSettings,
}

impl AuthUseCases {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepo>,
        refresh_tokens: Arc<dyn RefreshTokenRepo>,
        reset_tokens: Arc<dyn PasswordResetTokenRepo>,
        plans: Arc<dyn PlanRepo>,
        user_plans: Arc<dyn UserPlanRepo>,
        notifier: Arc<dyn Notifier>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenIssuer>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            reset_tokens,
            plans,
            user_plans,
            notifier,
            hasher,
            tokens,
            settings,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> AppResult<PublicUser> {
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }
        if !is_valid_password(&input.password) {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let first_name = input.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(AppError::InvalidInput("First name is required".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".into()));
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        let code = generate_verification_code();
        let expires_at = Utc::now().naive_utc() + self.settings.verification_code_ttl;

        // The unique index is the real guard; a lost race surfaces as Conflict too.
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                first_name,
                last_name: input.last_name.trim().to_string(),
                verification_code: code.clone(),
                verification_code_expires: expires_at,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict("Email already in use".into()),
                other => other,
            })?;

        self.notifier
            .send_verification_code(&user.email, &user.first_name, &code)
            .await?;

        tracing::info!(user_id = %user.id, "User registered, verification code sent");
        Ok(PublicUser::from(&user))
    }

    #[instrument(skip(self))]
    pub async fn resend_code(&self, email: &str) -> AppResult<()> {
        let user = self.require_user_by_email(email).await?;
        if user.email_verified {
            return Err(AppError::InvalidState("Email already verified".into()));
        }

        let code = generate_verification_code();
        let expires_at = Utc::now().naive_utc() + self.settings.verification_code_ttl;
        self.users
            .set_verification_code(user.id, &code, expires_at)
            .await?;

        self.notifier
            .send_verification_code(&user.email, &user.first_name, &code)
            .await
    }

    #[instrument(skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> AppResult<AuthSession> {
        if non_blank(Some(email)).is_none() {
            return Err(AppError::InvalidInput("Email is required".into()));
        }
        let user = self.require_user_by_email(email).await?;
        if user.email_verified {
            return Err(AppError::InvalidState("Email already verified".into()));
        }
        if user.verification_code.as_deref() != Some(code.trim()) {
            return Err(AppError::InvalidInput("Invalid verification code".into()));
        }
        let now = Utc::now().naive_utc();
        match user.verification_code_expires {
            Some(expires_at) if now < expires_at => {}
            _ => return Err(AppError::Expired("Verification code has expired".into())),
        }

        // The code stays valid until every step below has succeeded.
        let tokens = self
            .generate_token_pair(user.id, &user.email, user.role)
            .await?;
        if let Err(e) = self.assign_free_plan(user.id, now).await {
            self.discard_refresh_token(&tokens.refresh_token).await;
            return Err(e);
        }
        let user = match self.users.mark_verified(user.id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.discard_refresh_token(&tokens.refresh_token).await;
                return Err(AppError::InvalidState("Email already verified".into()));
            }
            Err(e) => {
                self.discard_refresh_token(&tokens.refresh_token).await;
                return Err(e);
            }
        };

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(AuthSession {
            tokens,
            user: PublicUser::from(&user),
        })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let user = self.require_user_by_email(email).await?;
        if !user.email_verified {
            return Err(AppError::Forbidden(
                "Please verify your email to log in.".into(),
            ));
        }
        if !self.hasher.verify(password, &user.password_hash).await? {
            return Err(AppError::Forbidden("Invalid credentials".into()));
        }
        if !user.is_profile_complete() {
            return Err(AppError::Forbidden(
                "Please complete your profile before logging in.".into(),
            ));
        }

        let tokens = self
            .generate_token_pair(user.id, &user.email, user.role)
            .await?;
        Ok(AuthSession {
            tokens,
            user: PublicUser::from(&user),
        })
    }

    /// Single-use rotation: the presented token is consumed before a new
    /// pair is minted. Of two concurrent callers only the one whose delete
    /// removed the row proceeds.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let Some(refresh_token) = non_blank(Some(refresh_token)) else {
            return Err(AppError::Unauthorized("Refresh token is required".into()));
        };

        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".into()))?;

        let token_hash = hash_token(refresh_token);
        let record = self
            .refresh_tokens
            .find(&token_hash)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        if claims.sub != record.user_id.to_string() {
            return Err(AppError::Unauthorized(
                "Token does not belong to this user".into(),
            ));
        }

        if !self.refresh_tokens.delete(&token_hash).await? {
            return Err(AppError::Unauthorized("Invalid refresh token".into()));
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        self.generate_token_pair(user.id, &user.email, user.role)
            .await
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let Some(refresh_token) = non_blank(Some(refresh_token)) else {
            return Err(AppError::InvalidInput("Refresh token is required".into()));
        };
        if !self.refresh_tokens.delete(&hash_token(refresh_token)).await? {
            return Err(AppError::NotFound(
                "Refresh token not found or already logged out".into(),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        if non_blank(Some(email)).is_none() {
            return Err(AppError::InvalidInput("Email is required".into()));
        }
        let user = self.require_user_by_email(email).await?;

        let raw = generate_token();
        let expires_at = Utc::now().naive_utc() + self.settings.password_reset_ttl;
        self.reset_tokens
            .create(user.id, &hash_token(&raw), expires_at)
            .await?;

        let link = format!(
            "{}/reset-password?token={}",
            self.settings.frontend_url, raw
        );
        self.notifier.send_reset_link(&user.email, &link).await
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let Some(token) = non_blank(Some(token)) else {
            return Err(AppError::InvalidInput("Token is required".into()));
        };
        if new_password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".into()));
        }
        if !is_valid_password(new_password) {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let token_hash = hash_token(token);
        let record = self
            .reset_tokens
            .find(&token_hash)
            .await?
            .ok_or(AppError::InvalidOrExpired)?;

        if record.expires_at <= Utc::now().naive_utc() {
            self.reset_tokens.delete(&token_hash).await?;
            return Err(AppError::Expired("Token expired".into()));
        }

        let password_hash = self.hasher.hash(new_password).await?;

        // Consume before writing so a token can only ever change one password.
        if !self.reset_tokens.delete(&token_hash).await? {
            return Err(AppError::InvalidOrExpired);
        }
        self.users
            .update_password(record.user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %record.user_id, "Password reset");
        Ok(())
    }

    /// Mints a pair and records its refresh half. No pair is returned unless
    /// the record was stored.
    pub async fn generate_token_pair(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
    ) -> AppResult<TokenPair> {
        let pair = self.tokens.issue_pair(user_id, email, role)?;
        self.refresh_tokens
            .create(user_id, &hash_token(&pair.refresh_token))
            .await?;
        Ok(pair)
    }

    async fn assign_free_plan(&self, user_id: Uuid, now: NaiveDateTime) -> AppResult<()> {
        let Some(free_plan) = self
            .plans
            .find_by_title(&self.settings.free_plan_title)
            .await?
        else {
            tracing::warn!(
                title = %self.settings.free_plan_title,
                "Free plan missing from catalogue, skipping assignment"
            );
            return Ok(());
        };
        self.user_plans
            .upsert(UpsertUserPlan {
                user_id,
                plan_id: free_plan.id,
                payment_id: None,
                window: SubscriptionWindow::starting_at(now, free_plan.duration_in_days),
            })
            .await?;
        Ok(())
    }

    /// Best effort; a leftover row only outlives its JWT expiry.
    async fn discard_refresh_token(&self, refresh_token: &str) {
        if let Err(e) = self.refresh_tokens.delete(&hash_token(refresh_token)).await {
            tracing::warn!(error = %e, "Failed to discard unused refresh token");
        }
    }

    async fn require_user_by_email(&self, email: &str) -> AppResult<UserProfile> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Fixed-length numeric code, zero padded.
pub fn generate_verification_code() -> String {
    let n: u32 = rand::rngs::OsRng.gen_range(0..1_000_000);
    format!("{:0width$}", n, width = VERIFICATION_CODE_LEN)
}

pub fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Tokens are stored only as their SHA-256 digest.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
