//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p stowage-api`. Every test app gets its own
//! temp directory holding the object store, the staging directory and the static files.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stowage_api::setup::routes;
use stowage_api::{AppState, StagingArea};
use stowage_core::Config;
use stowage_storage::{LocalStorage, Storage};
use tempfile::TempDir;

use storage::RecordingStorage;

/// Test application: server plus the directories and storage behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<RecordingStorage>,
    pub _root: TempDir,
    pub objects_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names currently present in the staging directory.
    pub fn staged_files(&self) -> Vec<String> {
        list_dir(&self.temp_dir)
    }
}

fn list_dir(path: &Path) -> Vec<String> {
    match std::fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn test_config(root: &Path, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("STORAGE_BACKEND".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            root.join("objects").display().to_string(),
        ),
        ("TEMP_DIR".to_string(), root.join("temp").display().to_string()),
        (
            "STATIC_DIR".to_string(),
            root.join("public").display().to_string(),
        ),
    ]);
    for (name, value) in extra {
        vars.insert(name.to_string(), value.to_string());
    }
    Config::from_vars(|name| vars.get(name).cloned()).expect("Invalid test configuration")
}

/// Test app on local storage with default settings.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

/// Test app on local storage with extra configuration variables.
pub async fn setup_test_app_with(extra: &[(&str, &str)]) -> TestApp {
    let root = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(root.path(), extra);
    let objects_dir = root.path().join("objects");

    let local = LocalStorage::new(&objects_dir)
        .await
        .expect("Failed to create local storage");
    let storage = Arc::new(RecordingStorage::new(Arc::new(local)));

    build_test_app(root, config, storage).await
}

/// Test app on an arbitrary storage implementation.
pub async fn setup_test_app_on(backend: Arc<dyn Storage>) -> TestApp {
    let root = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(root.path(), &[]);
    let storage = Arc::new(RecordingStorage::new(backend));
    build_test_app(root, config, storage).await
}

async fn build_test_app(root: TempDir, config: Config, storage: Arc<RecordingStorage>) -> TestApp {
    std::fs::create_dir_all(config.static_dir()).expect("Failed to create static directory");

    let staging = StagingArea::new(config.temp_dir())
        .await
        .expect("Failed to create staging directory");
    let state = Arc::new(AppState::new(&config, storage.clone(), staging));
    let router = routes::setup_routes(&config, state).expect("Failed to set up routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        objects_dir: root.path().join("objects"),
        temp_dir: config.temp_dir().to_path_buf(),
        static_dir: config.static_dir().to_path_buf(),
        _root: root,
    }
}
