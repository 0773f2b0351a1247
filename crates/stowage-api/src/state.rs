use crate::staging::StagingArea;
use std::sync::Arc;
use stowage_core::Config;
use stowage_storage::Storage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub staging: StagingArea,
    /// Prefixes the listing is grouped by; empty means a flat listing.
    pub key_prefixes: Vec<String>,
    /// Prepended to the file name of every upload.
    pub upload_key_prefix: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, storage: Arc<dyn Storage>, staging: StagingArea) -> Self {
        AppState {
            storage,
            staging,
            key_prefixes: config.key_prefixes().to_vec(),
            upload_key_prefix: config.upload_key_prefix().map(String::from),
        }
    }
}
