//! Error types for Bookhaven server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    NoSuchLoan = 6,
    BookUnavailable = 7,
    InsufficientStock = 8,
    AlreadyReturned = 9,
    Duplicate = 10,
    BadValue = 11,
    BookHasActiveLoans = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User with id {0} not found")]
    UserNotFound(i32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Loan with id {0} not found")]
    LoanNotFound(i32),

    #[error("Loan {0} has already been returned")]
    AlreadyReturned(i32),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Numeric code reported to API clients
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NoSuchBook,
            AppError::UserNotFound(_) => ErrorCode::NoSuchUser,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::BookUnavailable(_) => ErrorCode::BookUnavailable,
            AppError::InsufficientStock(_) => ErrorCode::InsufficientStock,
            AppError::LoanNotFound(_) => ErrorCode::NoSuchLoan,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::BookUnavailable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::InsufficientStock(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::LoanNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyReturned(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AppError::LoanNotFound(7).code(), ErrorCode::NoSuchLoan);
        assert_eq!(
            AppError::AlreadyReturned(7).code(),
            ErrorCode::AlreadyReturned
        );
        assert_eq!(
            AppError::BookUnavailable("b".into()).code(),
            ErrorCode::BookUnavailable
        );
        assert_eq!(
            AppError::InsufficientStock("b".into()).code(),
            ErrorCode::InsufficientStock
        );
    }

    #[test]
    fn database_errors_wrap_sqlx() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), ErrorCode::DbFailure);
    }
}
