//! Defaults shared across crates.

/// Bucket used when neither `S3_BUCKET_NAME` nor `S3_BUCKET` is set.
pub const DEFAULT_BUCKET_NAME: &str = "cc-bucket-2-3";

pub const DEFAULT_REGION: &str = "us-east-1";

pub const DEFAULT_PORT: u16 = 3000;

/// Staging directory for upload/download bridging, relative to the working directory.
pub const DEFAULT_TEMP_DIR: &str = "temp";

pub const DEFAULT_STATIC_DIR: &str = "public";

pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 100;

/// Content type used when neither the client nor the store provides one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
