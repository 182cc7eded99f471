use crate::app_error::{AppError, ErrorCode, GENERIC_ERROR_MESSAGE};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        let code = ErrorCode::from(&self);
        match self {
            AppError::InvalidInput(msg) | AppError::InvalidState(msg) => {
                error_resp(StatusCode::BAD_REQUEST, code, Some(msg))
            }
            AppError::Expired(msg) => error_resp(StatusCode::BAD_REQUEST, code, Some(msg)),
            AppError::InvalidOrExpired => error_resp(
                StatusCode::BAD_REQUEST,
                code,
                Some("Invalid or expired token".into()),
            ),
            AppError::InvalidSignature => {
                error_resp(StatusCode::BAD_REQUEST, code, Some("Invalid signature".into()))
            }
            AppError::PaymentGateway(msg) => error_resp(StatusCode::BAD_REQUEST, code, Some(msg)),
            AppError::Conflict(msg) => error_resp(StatusCode::CONFLICT, code, Some(msg)),
            AppError::NotFound(msg) => error_resp(StatusCode::NOT_FOUND, code, Some(msg)),
            AppError::Forbidden(msg) => error_resp(StatusCode::FORBIDDEN, code, Some(msg)),
            AppError::Unauthorized(msg) => error_resp(StatusCode::UNAUTHORIZED, code, Some(msg)),
            AppError::InvalidToken => error_resp(StatusCode::UNAUTHORIZED, code, None),
            AppError::Database(_) | AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                Some(GENERIC_ERROR_MESSAGE.into()),
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
