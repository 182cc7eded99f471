use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::{AppError, AppResult},
    use_cases::payment::InitiatePayment,
};

const SIGNATURE_HEADER: &str = "verif-hash";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiatePayload {
    plan_id: Option<Uuid>,
    amount: Option<i64>,
    email: Option<String>,
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    first_name: String,
}

#[derive(Deserialize)]
struct VerifyQuery {
    #[serde(default)]
    tx_ref: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate))
        .route("/verify", get(verify))
        .route("/webhook", post(webhook))
}

async fn initiate(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<InitiatePayload>,
) -> AppResult<impl IntoResponse> {
    let plan_id = payload
        .plan_id
        .ok_or_else(|| AppError::InvalidInput("Plan id is required".into()))?;
    let amount = payload
        .amount
        .ok_or_else(|| AppError::InvalidInput("Amount is required".into()))?;

    let response = app_state
        .payment_use_cases
        .initiate(InitiatePayment {
            plan_id,
            amount,
            email: payload.email.unwrap_or(auth.email),
            user_id: auth.user_id,
            phone_number: payload.phone_number,
            first_name: payload.first_name,
        })
        .await?;
    Ok(Json(response))
}

async fn verify(
    State(app_state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<VerifyQuery>,
) -> AppResult<impl IntoResponse> {
    let response = app_state.payment_use_cases.verify(&query.tx_ref).await?;
    Ok(Json(response))
}

/// Raw body so the payload is only parsed after the signature check.
async fn webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = app_state
        .payment_use_cases
        .handle_webhook(&body, signature)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": outcome.message(),
    })))
}
