use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::app_state::AppState, app_error::AppResult, use_cases::auth::RegisterInput,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[derive(Deserialize)]
struct EmailPayload {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct VerifyCodePayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    code: String,
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct RefreshPayload {
    #[serde(default)]
    refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordPayload {
    #[serde(default)]
    new_password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-code", post(verify_code))
        .route("/resend-code", post(resend_code))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
}

async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .auth_use_cases
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "A verification code has been sent to your email address.",
            "user": user,
        })),
    ))
}

async fn verify_code(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyCodePayload>,
) -> AppResult<impl IntoResponse> {
    let session = app_state
        .auth_use_cases
        .verify_code(&payload.email, &payload.code)
        .await?;
    Ok(Json(json!({
        "message": "Email verified successfully",
        "access_token": session.tokens.access_token,
        "refresh_token": session.tokens.refresh_token,
        "user": session.user,
    })))
}

async fn resend_code(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> AppResult<impl IntoResponse> {
    app_state.auth_use_cases.resend_code(&payload.email).await?;
    Ok(Json(json!({
        "message": "A new verification code has been sent to your email address."
    })))
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let session = app_state
        .auth_use_cases
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(session))
}

async fn refresh(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> AppResult<impl IntoResponse> {
    let tokens = app_state
        .auth_use_cases
        .refresh(&payload.refresh_token)
        .await?;
    Ok(Json(tokens))
}

async fn logout(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .auth_use_cases
        .logout(&payload.refresh_token)
        .await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .auth_use_cases
        .forgot_password(&payload.email)
        .await?;
    Ok(Json(json!({ "message": "Password reset link sent" })))
}

async fn reset_password(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .auth_use_cases
        .reset_password(&token, &payload.new_password)
        .await?;
    Ok(Json(json!({
        "message": "Password reset successful. You can now log in."
    })))
}
