//! Stowage Core Library
//!
//! This crate provides configuration, error types, and the storage backend enum
//! shared by the storage adapters and the HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
