use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::auth::{NewUser, ProfileUpdate, UserProfile, UserRepo},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role: row.get("role"),
        email_verified: row.get("email_verified"),
        verification_code: row.get("verification_code"),
        verification_code_expires: row.get("verification_code_expires"),
        phone_number: row.get("phone_number"),
        age_range: row.get("age_range"),
        gender: row.get("gender"),
        country: row.get("country"),
        target_language: row.get("target_language"),
        reason_for_learning: row.get("reason_for_learning"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, email, password_hash, first_name, last_name, role, email_verified,
    verification_code, verification_code_expires,
    phone_number, age_range, gender, country, target_language, reason_for_learning,
    created_at, updated_at
"#;

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", SELECT_COLS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn create(&self, input: NewUser) -> AppResult<UserProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name,
                               verification_code, verification_code_expires)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.verification_code)
        .bind(input.verification_code_expires)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn set_verification_code(
        &self,
        user_id: Uuid,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verification_code = $2, verification_code_expires = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn mark_verified(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email_verified = TRUE, verification_code = NULL,
                verification_code_expires = NULL, updated_at = NOW()
            WHERE id = $1 AND email_verified = FALSE
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> AppResult<UserProfile> {
        // NULL parameters keep the stored value
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET phone_number = COALESCE($2, phone_number),
                age_range = COALESCE($3, age_range),
                gender = COALESCE($4, gender),
                country = COALESCE($5, country),
                target_language = COALESCE($6, target_language),
                reason_for_learning = COALESCE($7, reason_for_learning),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(update.phone_number)
        .bind(update.age_range)
        .bind(update.gender)
        .bind(update.country)
        .bind(update.target_language)
        .bind(update.reason_for_learning)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        row.as_ref()
            .map(row_to_profile)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    async fn change_email(
        &self,
        user_id: Uuid,
        new_email: &str,
        code: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<UserProfile> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $2, verification_code = $3, verification_code_expires = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(new_email)
        .bind(code)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        row.as_ref()
            .map(row_to_profile)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
