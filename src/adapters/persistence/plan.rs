use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::plans::{PlanProfile, PlanRepo},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PlanProfile {
    PlanProfile {
        id: row.get("id"),
        title: row.get("title"),
        price: row.get("price"),
        duration_in_days: row.get("duration_in_days"),
        features: row.get("features"),
        button_text: row.get("button_text"),
        discount: row.get("discount"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str =
    "id, title, price, duration_in_days, features, button_text, discount, created_at";

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn list(&self) -> AppResult<Vec<PlanProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM plans ORDER BY price ASC, created_at ASC",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!("SELECT {} FROM plans WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<PlanProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM plans WHERE title = $1 LIMIT 1",
            SELECT_COLS
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }
}
