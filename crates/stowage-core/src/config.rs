//! Configuration module
//!
//! Configuration is read once at startup from the environment (and an optional `.env`
//! file) into an explicit [`Config`] value that is handed to the storage factory and
//! the router. Nothing reads the environment after startup.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BUCKET_NAME, DEFAULT_MAX_UPLOAD_SIZE_MB, DEFAULT_PORT, DEFAULT_REGION,
    DEFAULT_STATIC_DIR, DEFAULT_TEMP_DIR,
};
use crate::storage_types::StorageBackend;

/// Server settings shared by every deployment variant
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (LocalStack, MinIO, ...)
    pub endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    /// Listing groups, e.g. `original/` and `derived/`. Empty means one flat listing.
    pub key_prefixes: Vec<String>,
    /// Prefix prepended to the key of every uploaded file.
    pub upload_key_prefix: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub temp_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_size_bytes: usize,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = split_list(&var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let base = BaseConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            bucket: var("S3_BUCKET_NAME")
                .or_else(|| var("S3_BUCKET"))
                .unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string()),
            region: var("S3_REGION")
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: var("S3_ENDPOINT").filter(|s| !s.trim().is_empty()),
            local_storage_path: var("LOCAL_STORAGE_PATH").filter(|s| !s.trim().is_empty()),
            key_prefixes: var("KEY_PREFIXES")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            upload_key_prefix: var("UPLOAD_KEY_PREFIX").filter(|s| !s.trim().is_empty()),
        };

        let max_upload_size_mb: usize = var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| DEFAULT_MAX_UPLOAD_SIZE_MB.to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let config = Config {
            base,
            storage,
            temp_dir: PathBuf::from(var("TEMP_DIR").unwrap_or_else(|| DEFAULT_TEMP_DIR.to_string())),
            static_dir: PathBuf::from(
                var("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            max_upload_size_bytes,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET_NAME must not be empty when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        let prefixes = self
            .storage
            .key_prefixes
            .iter()
            .chain(self.storage.upload_key_prefix.iter());
        for prefix in prefixes {
            if prefix.starts_with('/') || prefix.contains("..") {
                return Err(anyhow::anyhow!(
                    "Key prefix '{}' must not start with '/' or contain '..'",
                    prefix
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn s3_bucket(&self) -> &str {
        &self.storage.bucket
    }

    pub fn s3_region(&self) -> &str {
        &self.storage.region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn key_prefixes(&self) -> &[String] {
        &self.storage.key_prefixes
    }

    pub fn upload_key_prefix(&self) -> Option<&str> {
        self.storage.upload_key_prefix.as_deref()
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
