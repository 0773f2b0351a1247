//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. An `HttpAppError` pairs an [`AppError`]
//! with the operation message shown to the client ("Failed to list objects"), and
//! renders the body `{success: false, message, error}`. Client errors carry only the
//! message; server errors also surface the underlying cause in `error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stowage_core::{AppError, ErrorMetadata, LogLevel};
use stowage_storage::StorageError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub message: Option<&'static str>,
}

impl HttpAppError {
    pub fn new(message: &'static str, error: impl Into<AppError>) -> Self {
        HttpAppError {
            error: error.into(),
            message: Some(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> ErrorResponse {
        if self.error.is_client_error() {
            ErrorResponse {
                success: false,
                message: self.error.client_message(),
                error: None,
            }
        } else {
            ErrorResponse {
                success: false,
                message: self.message.unwrap_or("Internal server error").to_string(),
                error: Some(self.error.client_message()),
            }
        }
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError {
            error,
            message: None,
        }
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError::from(storage_to_app_error(err))
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError::from(AppError::Io(err))
    }
}

/// Attach an operation message to any error convertible into [`HttpAppError`].
pub trait ResponseContext<T> {
    fn with_message(self, message: &'static str) -> Result<T, HttpAppError>;
}

impl<T, E> ResponseContext<T> for Result<T, E>
where
    E: Into<HttpAppError>,
{
    fn with_message(self, message: &'static str) -> Result<T, HttpAppError> {
        self.map_err(|e| {
            let mut err = e.into();
            err.message.get_or_insert(message);
            err
        })
    }
}

fn storage_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidKey(msg) => AppError::BadRequest(format!("Invalid key: {}", msg)),
        StorageError::IoError(io) => AppError::Io(io),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
        other => AppError::Storage(other.to_string()),
    }
}

fn log_error(err: &HttpAppError) {
    let error = &err.error;
    let error_type = error.error_type();
    let operation = err.message.unwrap_or_default();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, operation, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, operation, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self);
        (self.status(), Json(self.body())).into_response()
    }
}
