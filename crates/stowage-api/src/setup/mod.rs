//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a servable router.

pub mod routes;
pub mod server;
pub mod storage;

use crate::staging::StagingArea;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use stowage_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Initialize telemetry first
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let storage = storage::setup_storage(&config).await?;

    let staging = StagingArea::new(config.temp_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create temp directory {}",
                config.temp_dir().display()
            )
        })?;
    tracing::info!(temp_dir = %staging.dir().display(), "Staging directory ready");

    let state = Arc::new(AppState::new(&config, storage, staging));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
