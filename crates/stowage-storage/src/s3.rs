use crate::keys::validate_key;
use crate::traits::{ObjectDownload, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectMeta, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:4566" for LocalStack, "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        // Credentials and the remaining settings come from the standard AWS_* variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Arc::new(store),
            bucket,
        })
    }

    /// Wrap an already configured object store (any S3-compatible implementation).
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        S3Storage {
            store,
            bucket: bucket.into(),
        }
    }
}

/// Object location for a raw key.
///
/// `Path::parse` keeps the key byte-for-byte, matching what S3 listings return;
/// `Path::from` would percent-encode characters such as `[`, `#` or `%`.
fn object_location(key: &str) -> StorageResult<Path> {
    validate_key(key)?;
    Path::parse(key).map_err(|e| StorageError::InvalidKey(e.to_string()))
}

/// Directory part of a raw prefix: `original/ca` lists under `original`.
///
/// object_store lists by whole path segments, so the raw prefix is applied as a
/// filter on top of the segment listing. A directory that isn't a valid location
/// falls back to listing from the root.
fn listing_root(prefix: &str) -> Option<Path> {
    prefix
        .rfind('/')
        .map(|idx| &prefix[..idx])
        .filter(|dir| !dir.is_empty())
        .and_then(|dir| Path::parse(dir).ok())
}

fn to_stored_object(meta: ObjectMeta) -> StoredObject {
    StoredObject {
        key: meta.location.to_string(),
        last_modified: meta.last_modified,
        e_tag: meta.e_tag,
        size: meta.size,
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<StoredObject>> {
        let start = std::time::Instant::now();
        let root = prefix.and_then(listing_root);

        let result: ObjectResult<Vec<ObjectMeta>> =
            self.store.list(root.as_ref()).try_collect().await;

        let metas = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                prefix = ?prefix,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 list failed"
            );
            StorageError::ListFailed(e.to_string())
        })?;

        let mut objects: Vec<StoredObject> = metas
            .into_iter()
            .map(to_stored_object)
            .filter(|o| prefix.map_or(true, |p| o.key.starts_with(p)))
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::info!(
            bucket = %self.bucket,
            prefix = ?prefix,
            count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(objects)
    }

    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<()> {
        let location = object_location(key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectDownload> {
        let location = object_location(key)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let content_length = result.meta.size;

        let bucket = self.bucket.clone();
        let stream_key = key.to_string();
        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %stream_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download started"
        );

        Ok(ObjectDownload {
            content_type,
            content_length,
            stream: Box::pin(stream),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn memory_storage() -> S3Storage {
        S3Storage::from_store(Arc::new(InMemory::new()), "test-bucket")
    }

    async fn read_all(download: ObjectDownload) -> Vec<u8> {
        let chunks: Vec<Bytes> = download.stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_put_then_get_keeps_content_type() {
        let storage = memory_storage();
        storage
            .put("original/cat.png", "image/png", b"png bytes".to_vec())
            .await
            .unwrap();

        let download = storage.get("original/cat.png").await.unwrap();
        assert_eq!(download.content_type.as_deref(), Some("image/png"));
        assert_eq!(download.content_length, 9);
        assert_eq!(read_all(download).await, b"png bytes");
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let storage = memory_storage();
        let result = storage.get("missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == "missing.txt"));
    }

    #[tokio::test]
    async fn test_list_empty_bucket() {
        let storage = memory_storage();
        assert!(storage.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_raw_prefix() {
        let storage = memory_storage();
        for key in ["original/cat.png", "original/dog.png", "derived/cat.webp", "top.txt"] {
            storage.put(key, "application/octet-stream", vec![1, 2, 3]).await.unwrap();
        }

        let all = storage.list(None).await.unwrap();
        let keys: Vec<_> = all.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            ["derived/cat.webp", "original/cat.png", "original/dog.png", "top.txt"]
        );

        let originals = storage.list(Some("original/")).await.unwrap();
        assert_eq!(originals.len(), 2);
        assert!(originals.iter().all(|o| o.size == 3));

        let partial = storage.list(Some("original/c")).await.unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].key, "original/cat.png");
    }

    #[tokio::test]
    async fn test_rejects_traversing_keys() {
        let storage = memory_storage();
        let result = storage.put("../escape", "text/plain", vec![]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_keys_with_reserved_characters_round_trip() {
        let storage = memory_storage();
        let keys = ["photo [1].png", "100%.txt", "a#b.txt", "docs/{draft} ^1.md"];
        for key in keys {
            storage.put(key, "text/plain", key.as_bytes().to_vec()).await.unwrap();
        }

        let listed = storage.list(None).await.unwrap();
        let mut listed_keys: Vec<_> = listed.iter().map(|o| o.key.clone()).collect();
        let mut expected: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
        listed_keys.sort();
        expected.sort();
        assert_eq!(listed_keys, expected);

        for object in &listed {
            let download = storage.get(&object.key).await.unwrap();
            assert_eq!(read_all(download).await, object.key.as_bytes());
        }

        let drafts = storage.list(Some("docs/{draft}")).await.unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_segments() {
        let storage = memory_storage();
        let result = storage.put("a//b.txt", "text/plain", vec![]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_listing_root() {
        assert_eq!(listing_root("original/"), Some(Path::from("original")));
        assert_eq!(listing_root("a/b/c"), Some(Path::from("a/b")));
        assert_eq!(listing_root("orig"), None);
        assert_eq!(
            listing_root("photos [2024]/x"),
            Some(Path::parse("photos [2024]").unwrap())
        );
    }
}
