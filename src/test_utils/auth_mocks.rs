//! In-memory mocks for the account and token storage traits, plus a notifier
//! that records what it was asked to send.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{
        NewUser, Notifier, PasswordResetRecord, PasswordResetTokenRepo, ProfileUpdate,
        RefreshTokenRecord, RefreshTokenRepo, UserProfile, UserRepo, hash_token,
    },
    domain::entities::user_role::UserRole,
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, UserProfile>>,
    /// Makes `find_by_email` miss, so a racing insert reaches the unique check.
    pub hide_from_lookup: AtomicBool,
    /// Makes `mark_verified` a database error.
    pub fail_verify: AtomicBool,
    /// Lets a racing request verify the user just before `mark_verified`.
    pub lose_verify_race: AtomicBool,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserProfile>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
            ..Self::default()
        }
    }

    pub fn insert(&self, user: UserProfile) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get_by_email(&self, email: &str) -> Option<UserProfile> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Moves the pending code's expiry into the past.
    pub fn expire_code(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.verification_code_expires = Some(Utc::now().naive_utc() - Duration::minutes(1));
        }
    }

    fn update<F>(&self, user_id: Uuid, apply: F) -> AppResult<UserProfile>
    where
        F: FnOnce(&mut UserProfile),
    {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        apply(user);
        user.updated_at = Some(Utc::now().naive_utc());
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        if self.hide_from_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.get_by_email(email))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, input: NewUser) -> AppResult<UserProfile> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == input.email) {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }

        let now = Utc::now().naive_utc();
        let user = UserProfile {
            id: Uuid::new_v4(),
            email: input.email,
            password_hash: input.password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: UserRole::User,
            email_verified: false,
            verification_code: Some(input.verification_code),
            verification_code_expires: Some(input.verification_code_expires),
            phone_number: None,
            age_range: None,
            gender: None,
            country: None,
            target_language: None,
            reason_for_learning: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_verification_code(
        &self,
        user_id: Uuid,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        self.update(user_id, |u| {
            u.verification_code = Some(code.to_string());
            u.verification_code_expires = Some(expires_at);
        })
        .map(|_| ())
    }

    async fn mark_verified(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        if self.fail_verify.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if self.lose_verify_race.load(Ordering::SeqCst) {
            user.email_verified = true;
        }
        if user.email_verified {
            return Ok(None);
        }
        user.email_verified = true;
        user.verification_code = None;
        user.verification_code_expires = None;
        user.updated_at = Some(Utc::now().naive_utc());
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        self.update(user_id, |u| u.password_hash = password_hash.to_string())
            .map(|_| ())
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile> {
        self.update(user_id, |u| {
            if update.phone_number.is_some() {
                u.phone_number = update.phone_number;
            }
            if update.age_range.is_some() {
                u.age_range = update.age_range;
            }
            if update.gender.is_some() {
                u.gender = update.gender;
            }
            if update.country.is_some() {
                u.country = update.country;
            }
            if update.target_language.is_some() {
                u.target_language = update.target_language;
            }
            if update.reason_for_learning.is_some() {
                u.reason_for_learning = update.reason_for_learning;
            }
        })
    }

    async fn change_email(
        &self,
        user_id: Uuid,
        new_email: &str,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<UserProfile> {
        let taken = self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.id != user_id && u.email == new_email);
        if taken {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }
        self.update(user_id, |u| {
            u.email = new_email.to_string();
            u.verification_code = Some(code.to_string());
            u.verification_code_expires = Some(expires_at);
        })
    }
}

// ============================================================================
// InMemoryRefreshTokenRepo
// ============================================================================

/// Keyed by token hash, like the `refresh_tokens` table.
#[derive(Default)]
pub struct InMemoryRefreshTokenRepo {
    pub tokens: Mutex<HashMap<String, RefreshTokenRecord>>,
    pub fail_writes: AtomicBool,
}

impl InMemoryRefreshTokenRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    /// Whether the raw token (not its hash) is currently stored.
    pub fn contains(&self, raw: &str) -> bool {
        self.tokens.lock().unwrap().contains_key(&hash_token(raw))
    }

    pub fn insert_raw(&self, raw: &str, user_id: Uuid) {
        let token_hash = hash_token(raw);
        self.tokens.lock().unwrap().insert(
            token_hash.clone(),
            RefreshTokenRecord {
                token_hash,
                user_id,
                created_at: Utc::now().naive_utc(),
            },
        );
    }
}

#[async_trait]
impl RefreshTokenRepo for InMemoryRefreshTokenRepo {
    async fn create(&self, user_id: Uuid, token_hash: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.contains_key(token_hash) {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }
        tokens.insert(
            token_hash.to_string(),
            RefreshTokenRecord {
                token_hash: token_hash.to_string(),
                user_id,
                created_at: Utc::now().naive_utc(),
            },
        );
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.tokens.lock().unwrap().get(token_hash).cloned())
    }

    async fn delete(&self, token_hash: &str) -> AppResult<bool> {
        Ok(self.tokens.lock().unwrap().remove(token_hash).is_some())
    }
}

// ============================================================================
// InMemoryPasswordResetTokenRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPasswordResetTokenRepo {
    pub tokens: Mutex<HashMap<String, PasswordResetRecord>>,
}

impl InMemoryPasswordResetTokenRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn contains_hash(&self, token_hash: &str) -> bool {
        self.tokens.lock().unwrap().contains_key(token_hash)
    }

    pub fn expire_all(&self) {
        let past = Utc::now().naive_utc() - Duration::minutes(1);
        for record in self.tokens.lock().unwrap().values_mut() {
            record.expires_at = past;
        }
    }
}

#[async_trait]
impl PasswordResetTokenRepo for InMemoryPasswordResetTokenRepo {
    async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        self.tokens.lock().unwrap().insert(
            token_hash.to_string(),
            PasswordResetRecord {
                token_hash: token_hash.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> AppResult<Option<PasswordResetRecord>> {
        Ok(self.tokens.lock().unwrap().get(token_hash).cloned())
    }

    async fn delete(&self, token_hash: &str) -> AppResult<bool> {
        Ok(self.tokens.lock().unwrap().remove(token_hash).is_some())
    }
}

// ============================================================================
// RecordingNotifier
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentEmail {
    VerificationCode { to: String, code: String },
    Welcome { to: String },
    ResetLink { to: String, link: String },
}

/// Records every message instead of sending it. Set `fail` to make sends error.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent.lock().unwrap().iter().rev().find_map(|m| match m {
            SentEmail::VerificationCode { to, code } if to == email => Some(code.clone()),
            _ => None,
        })
    }

    pub fn last_reset_link_for(&self, email: &str) -> Option<String> {
        self.sent.lock().unwrap().iter().rev().find_map(|m| match m {
            SentEmail::ResetLink { to, link } if to == email => Some(link.clone()),
            _ => None,
        })
    }

    /// Raw reset token carried in the last link sent to `email`.
    pub fn last_reset_token_for(&self, email: &str) -> Option<String> {
        self.last_reset_link_for(email)
            .and_then(|link| link.split_once("token=").map(|(_, t)| t.to_string()))
    }

    pub fn welcome_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, SentEmail::Welcome { .. }))
            .count()
    }

    fn record(&self, email: SentEmail) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("Failed to send email".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_verification_code(&self, email: &str, _name: &str, code: &str) -> AppResult<()> {
        self.record(SentEmail::VerificationCode {
            to: email.to_string(),
            code: code.to_string(),
        })
    }

    async fn send_welcome_email(&self, email: &str, _name: &str) -> AppResult<()> {
        self.record(SentEmail::Welcome {
            to: email.to_string(),
        })
    }

    async fn send_reset_link(&self, email: &str, link: &str) -> AppResult<()> {
        self.record(SentEmail::ResetLink {
            to: email.to_string(),
            link: link.to_string(),
        })
    }
}
