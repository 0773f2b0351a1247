//! Stowage API Library
//!
//! This crate provides the HTTP handlers, staging-file management, and application setup
//! for the object-storage façade.

pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod staging;
pub mod state;
mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use staging::StagingArea;
pub use state::AppState;
