//! Error types for the Aklatan server

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
    NotFound = 2,
    BadValue = 3,
    InvalidDueDate = 4,
    PatronHasActiveLoan = 5,
    CopyUnavailable = 6,
    CopyAlreadyLoaned = 7,
    LoanAlreadyReturned = 8,
    Duplicate = 9,
    ConsistencyFailure = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Patron has an active loan: {0}")]
    PatronHasActiveLoan(String),

    #[error("Copy unavailable: {0}")]
    CopyUnavailable(String),

    #[error("Copy already loaned: {0}")]
    CopyAlreadyLoaned(String),

    #[error("Loan already returned: {0}")]
    AlreadyReturned(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::InvalidDueDate(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidDueDate, msg.clone())
            }
            AppError::PatronHasActiveLoan(msg) => {
                (StatusCode::CONFLICT, ErrorCode::PatronHasActiveLoan, msg.clone())
            }
            AppError::CopyUnavailable(msg) => {
                (StatusCode::CONFLICT, ErrorCode::CopyUnavailable, msg.clone())
            }
            AppError::CopyAlreadyLoaned(msg) => {
                (StatusCode::CONFLICT, ErrorCode::CopyAlreadyLoaned, msg.clone())
            }
            AppError::AlreadyReturned(msg) => {
                (StatusCode::CONFLICT, ErrorCode::LoanAlreadyReturned, msg.clone())
            }
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Consistency(msg) => {
                tracing::error!("Consistency error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::ConsistencyFailure,
                    "Internal consistency error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
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
