//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Fallible stream of object content chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// One entry of a bucket listing.
///
/// Field names follow the `Contents` entries of an S3 `ListObjectsV2` response so the
/// listing endpoint can hand entries back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    pub size: u64,
}

/// An object being fetched from storage.
pub struct ObjectDownload {
    pub content_type: Option<String>,
    pub content_length: u64,
    pub stream: ByteStream,
}

impl fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. The HTTP
/// layer only ever issues one of these calls per request and never retries.
#[async_trait]
pub trait Storage: Send + Sync {
    /// List objects, optionally restricted to keys starting with `prefix`.
    ///
    /// Entries are returned sorted by key. An empty bucket yields an empty vector.
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<StoredObject>>;

    /// Write `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Fetch an object as a stream of chunks.
    async fn get(&self, key: &str) -> StorageResult<ObjectDownload>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
