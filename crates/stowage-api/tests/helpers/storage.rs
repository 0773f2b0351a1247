//! Storage doubles for integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stowage_core::StorageBackend;
use stowage_storage::{ObjectDownload, Storage, StorageError, StorageResult, StoredObject};

/// Wraps a backend and counts calls per operation.
pub struct RecordingStorage {
    inner: Arc<dyn Storage>,
    lists: AtomicUsize,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

impl RecordingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        RecordingStorage {
            inner,
            lists: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
        }
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<StoredObject>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(prefix).await
    }

    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, content_type, data).await
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectDownload> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Backend whose every operation fails; `get` fails halfway through the body.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn list(&self, _prefix: Option<&str>) -> StorageResult<Vec<StoredObject>> {
        Err(StorageError::ListFailed("Access Denied".to_string()))
    }

    async fn put(&self, _key: &str, _content_type: &str, _data: Vec<u8>) -> StorageResult<()> {
        Err(StorageError::UploadFailed("Access Denied".to_string()))
    }

    async fn get(&self, _key: &str) -> StorageResult<ObjectDownload> {
        let chunks: Vec<Result<Bytes, StorageError>> = vec![
            Ok(Bytes::from_static(b"partial ")),
            Err(StorageError::DownloadFailed("connection reset".to_string())),
        ];
        Ok(ObjectDownload {
            content_type: Some("text/plain".to_string()),
            content_length: 64,
            stream: Box::pin(futures::stream::iter(chunks)),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
