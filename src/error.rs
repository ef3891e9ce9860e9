/// Unified error types for the CPF verifier
use crate::views::{messages, IndexView};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration and input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cache store is not connected
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render AppError as the form page carrying a user-facing message
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, messages::STORE_UNAVAILABLE)
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, messages::GENERIC_FAILURE), // Don't leak details
        };

        tracing::error!(error = %self, status = status.as_u16(), "request_failed");

        IndexView::with_error(message).into_response_with_status(status)
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;
