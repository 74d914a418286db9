// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fintrack_common::Notice;
use thiserror::Error;

use crate::storage::StoreError;
use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Email already registered.")]
    DuplicateEmail,

    #[error("This {0} already exists!")]
    DuplicateDetected(String),

    /// Deliberately silent about whether the email or the secret was wrong.
    #[error("Incorrect credentials.")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("CSRF token missing or invalid")]
    CsrfRejected,

    #[error("{0} not found.")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::PasswordMismatch => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail | AppError::DuplicateDetected(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::CsrfRejected => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::PasswordMismatch => "VAL_002",
            AppError::DuplicateEmail => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::Unauthenticated => "AUTH_003",
            AppError::CsrfRejected => "CSRF_001",
            AppError::DuplicateDetected(_) => "RES_001",
            AppError::NotFound(_) => "NF_001",
            AppError::RateLimitExceeded => "RATE_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Whether this is an infrastructure failure rather than a decision
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_)
        )
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "Something went wrong. Please try again.".to_string()
            },
            AppError::CsrfRejected => "Request rejected".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
            other => other.to_string(),
        }
    }

    /// The flash notice a page flow shows for a recoverable outcome.
    ///
    /// CSRF rejections and infrastructure failures never produce a notice.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            AppError::DuplicateDetected(_) => Some(Notice::info(self.to_string())),
            AppError::Unauthenticated => {
                Some(Notice::error("You can't access that page before logging in."))
            },
            AppError::Validation(_)
            | AppError::PasswordMismatch
            | AppError::DuplicateEmail
            | AppError::InvalidCredentials
            | AppError::NotFound(_)
            | AppError::RateLimitExceeded => Some(Notice::error(self.to_string())),
            AppError::CsrfRejected
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_internal() {
            tracing::error!(code = error_code, "request failed: {}", self);
        }

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.sanitized_message(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::DuplicateEmail,
            StoreError::Io(e) => AppError::Io(e),
            StoreError::Json(e) => AppError::Json(e),
            StoreError::Corrupt(msg) => AppError::Internal(msg),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed: {err}"))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
