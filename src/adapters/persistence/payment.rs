use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{GatewayUpdate, NewPayment, PaymentProfile, PaymentRepo},
    domain::entities::payment_status::PaymentStatus,
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PaymentProfile {
    PaymentProfile {
        id: row.get("id"),
        tx_ref: row.get("tx_ref"),
        amount: row.get("amount"),
        email: row.get("email"),
        plan_id: row.get("plan_id"),
        user_id: row.get("user_id"),
        status: row.get("status"),
        gateway_transaction_id: row.get("gateway_transaction_id"),
        gateway_reference: row.get("gateway_reference"),
        gateway_data: row.get("gateway_data"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, tx_ref, amount, email, plan_id, user_id, status,
    gateway_transaction_id, gateway_reference, gateway_data,
    created_at, updated_at
"#;

#[async_trait]
impl PaymentRepo for PostgresPersistence {
    async fn create(&self, input: NewPayment) -> AppResult<PaymentProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (id, tx_ref, amount, email, plan_id, user_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.tx_ref)
        .bind(input.amount)
        .bind(&input.email)
        .bind(input.plan_id)
        .bind(input.user_id)
        .bind(PaymentStatus::Pending)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn find_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE tx_ref = $1",
            SELECT_COLS
        ))
        .bind(tx_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn apply_gateway_update(
        &self,
        payment_id: Uuid,
        update: GatewayUpdate,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                gateway_transaction_id = $3,
                gateway_reference = $4,
                gateway_data = $5,
                updated_at = NOW() AT TIME ZONE 'UTC'
            WHERE id = $1 AND status = $6
            "#,
        )
        .bind(payment_id)
        .bind(update.status)
        .bind(update.transaction_id)
        .bind(update.reference)
        .bind(update.data)
        .bind(PaymentStatus::Pending)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
