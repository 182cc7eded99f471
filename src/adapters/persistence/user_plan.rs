use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::plans::{UpsertUserPlan, UserPlanProfile, UserPlanRepo},
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> UserPlanProfile {
    UserPlanProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        payment_id: row.get("payment_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
    }
}

const SELECT_COLS: &str = "id, user_id, plan_id, payment_id, start_date, end_date";

#[async_trait]
impl UserPlanRepo for PostgresPersistence {
    async fn upsert(&self, input: UpsertUserPlan) -> AppResult<UserPlanProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_plans (id, user_id, plan_id, payment_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
            SET plan_id = EXCLUDED.plan_id,
                payment_id = EXCLUDED.payment_id,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                updated_at = NOW()
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(input.payment_id)
        .bind(input.window.start_date)
        .bind(input.window.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserPlanProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_plans WHERE user_id = $1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }
}
