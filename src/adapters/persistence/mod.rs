use sqlx::PgPool;

use crate::app_error::AppError;

pub mod password_reset_token;
pub mod payment;
pub mod plan;
pub mod refresh_token;
pub mod user;
pub mod user_plan;

/// Postgres unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                    || msg.contains("duplicate key")
                {
                    AppError::Conflict("A record with this value already exists".into())
                } else {
                    // Keep the detail in the log only
                    tracing::error!(error = ?err, "Database error");
                    AppError::Database("Database operation failed".into())
                }
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
