//! Error types module
//!
//! All request-level failures are unified under [`AppError`]. The taxonomy is small:
//! client input errors map to 400, everything else (storage service, local I/O,
//! response construction) maps to 500 with the underlying message surfaced.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a missing upload
    Debug,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Message describing the underlying cause, surfaced to clients
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::Storage(_) => "Storage",
            AppError::Io(_) => "Io",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Storage(_) | AppError::Io(_) | AppError::Internal(_) => 500,
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::Storage(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
            AppError::Io(err) => err.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::BadRequest(_) => LogLevel::Debug,
            AppError::Storage(_) | AppError::Io(_) | AppError::Internal(_) => LogLevel::Error,
        }
    }
}
