use axum::{Json, Router, extract::State, response::IntoResponse, routing::patch};
use serde::Deserialize;
use serde_json::json;

use crate::{
    adapters::http::{app_state::AppState, middleware::AuthUser},
    app_error::AppResult,
    use_cases::auth::ProfileUpdate,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CompleteProfilePayload {
    phone_number: Option<String>,
    age_range: Option<String>,
    gender: Option<String>,
    country: Option<String>,
    target_language: Option<String>,
    reason_for_learning: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeEmailPayload {
    #[serde(default)]
    old_email: String,
    #[serde(default)]
    new_email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complete-profile", patch(complete_profile))
        .route("/change-email", patch(change_email))
}

async fn complete_profile(
    State(app_state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CompleteProfilePayload>,
) -> AppResult<impl IntoResponse> {
    let user = app_state
        .user_use_cases
        .complete_profile(
            auth.user_id,
            ProfileUpdate {
                phone_number: payload.phone_number,
                age_range: payload.age_range,
                gender: payload.gender,
                country: payload.country,
                target_language: payload.target_language,
                reason_for_learning: payload.reason_for_learning,
            },
        )
        .await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user,
    })))
}

async fn change_email(
    State(app_state): State<AppState>,
    Json(payload): Json<ChangeEmailPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .user_use_cases
        .change_email(&payload.old_email, &payload.new_email)
        .await?;
    Ok(Json(json!({
        "message": "Email updated. A new verification code has been sent."
    })))
}
