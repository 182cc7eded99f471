use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::auth::{PasswordResetRecord, PasswordResetTokenRepo},
};

#[async_trait]
impl PasswordResetTokenRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> AppResult<Option<PasswordResetRecord>> {
        let row = sqlx::query(
            "SELECT token_hash, user_id, expires_at FROM password_reset_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(|r| PasswordResetRecord {
            token_hash: r.get("token_hash"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
        }))
    }

    async fn delete(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
