//! Stowage Storage Library
//!
//! This crate provides the storage abstraction and its implementations: an S3 adapter
//! built on `object_store` and a local filesystem adapter for development and tests.
//!
//! # Storage keys
//!
//! Keys are path-like strings (`original/cat.png`). They are passed through to the
//! backend unchanged; prefix conventions such as `original/` and `derived/` are
//! configuration, not storage semantics. Keys must not contain `..` or start with `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use stowage_core::StorageBackend;
pub use traits::{ByteStream, ObjectDownload, Storage, StorageError, StorageResult, StoredObject};
