use thiserror::Error;

/// Fixed user-facing message for failures whose details must not leak.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Oops! Something broke, but it's not your fault. Give it another go.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Failures a caller may reasonably retry (store or gateway trouble).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::PaymentGateway(_) | AppError::Internal(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    Conflict,
    NotFound,
    Forbidden,
    Unauthorized,
    InvalidState,
    Expired,
    InvalidOrExpired,
    InvalidToken,
    InvalidSignature,
    PaymentGateway,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::Expired => "EXPIRED",
            ErrorCode::InvalidOrExpired => "INVALID_OR_EXPIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::PaymentGateway => "PAYMENT_GATEWAY_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl From<&AppError> for ErrorCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::InvalidState(_) => ErrorCode::InvalidState,
            AppError::Expired(_) => ErrorCode::Expired,
            AppError::InvalidOrExpired => ErrorCode::InvalidOrExpired,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::InvalidSignature => ErrorCode::InvalidSignature,
            AppError::PaymentGateway(_) => ErrorCode::PaymentGateway,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
