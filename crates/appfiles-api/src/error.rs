//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; storage and
//! core errors convert into `HttpAppError` and render consistently
//! (status, JSON body, logging).

use appfiles_core::{AppError, ErrorMetadata, LogLevel};
use appfiles_storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from appfiles-core)
///
/// Error details stay out of the response body unless enabled with
/// [`HttpAppError::with_details`]; sensitive errors never carry them.
#[derive(Debug)]
pub struct HttpAppError {
    error: AppError,
    expose_details: bool,
}

impl HttpAppError {
    pub fn with_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError {
            error,
            expose_details: false,
        }
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(path) => AppError::NotFound(format!("File not found: {}", path)),
            err @ StorageError::BackendError { .. } => {
                AppError::Storage(format_error_chain(&err))
            }
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError::from(app)
    }
}

fn format_error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let (details, error_type) = if self.expose_details && !app_error.is_sensitive() {
            (
                Some(app_error.to_string()),
                Some(app_error.error_type().to_string()),
            )
        } else {
            (None, None)
        };

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        });

        (status, body).into_response()
    }
}
