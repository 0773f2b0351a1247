//! Route configuration and setup.
//!
//! Object routes live under [`OBJECTS_PATH`]; everything unmatched falls through to the
//! static directory.

mod health;

use crate::constants::OBJECTS_PATH;
use crate::handlers::{object_download, object_list, object_upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use stowage_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let object_key_path = format!("{}/{{*key}}", OBJECTS_PATH);

    let app = Router::new()
        .route(
            OBJECTS_PATH,
            get(object_list::list_objects).post(object_upload::upload_object),
        )
        .route(&object_key_path, get(object_download::download_object))
        .route("/health", get(health::liveness_check))
        .fallback_service(ServeDir::new(config.static_dir()))
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(
        static_dir = %config.static_dir().display(),
        max_upload_mb = config.max_upload_size_bytes() / 1024 / 1024,
        "Routes configured"
    );

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::debug!("CORS configured to allow all origins");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
