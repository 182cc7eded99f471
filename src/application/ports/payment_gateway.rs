use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::app_error::AppResult;

/// Status string the gateway uses for an accepted API call.
pub const GATEWAY_SUCCESS: &str = "success";

#[derive(Debug, Clone, Serialize)]
pub struct ChargeCustomer {
    pub email: String,
    #[serde(rename = "phonenumber")]
    pub phone_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeCustomizations {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeMeta {
    pub plan_id: Uuid,
    pub user_id: Uuid,
}

/// Hosted-checkout request, serialized as the gateway expects it.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub tx_ref: String,
    pub amount: i64,
    pub currency: String,
    pub redirect_url: String,
    pub customer: ChargeCustomer,
    pub customizations: ChargeCustomizations,
    pub meta: ChargeMeta,
}

/// Outbound calls to the payment gateway. Responses are passed back verbatim;
/// transport failures and timeouts surface as `AppError::PaymentGateway`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<serde_json::Value>;
    async fn verify_by_reference(&self, tx_ref: &str) -> AppResult<serde_json::Value>;
}
