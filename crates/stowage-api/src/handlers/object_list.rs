use crate::constants::MSG_LIST_FAILED;
use crate::error::{HttpAppError, ResponseContext};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use stowage_storage::StoredObject;

#[derive(Debug, Serialize)]
pub struct ListObjectsResponse {
    pub success: bool,
    pub objects: Vec<StoredObject>,
    /// Per-prefix listings, present only when key prefixes are configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<BTreeMap<String, Vec<StoredObject>>>,
}

#[tracing::instrument(skip(state), fields(operation = "list_objects"))]
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListObjectsResponse>, HttpAppError> {
    if state.key_prefixes.is_empty() {
        let objects = state.storage.list(None).await.with_message(MSG_LIST_FAILED)?;
        return Ok(Json(ListObjectsResponse {
            success: true,
            objects,
            groups: None,
        }));
    }

    let listings = futures::future::try_join_all(
        state
            .key_prefixes
            .iter()
            .map(|prefix| state.storage.list(Some(prefix.as_str()))),
    )
    .await
    .with_message(MSG_LIST_FAILED)?;

    let mut objects = Vec::new();
    let mut groups = BTreeMap::new();
    for (prefix, entries) in state.key_prefixes.iter().zip(listings) {
        objects.extend(entries.iter().cloned());
        groups.insert(prefix.clone(), entries);
    }

    // Overlapping prefixes list the same object twice.
    objects.sort_by(|a, b| a.key.cmp(&b.key));
    objects.dedup_by(|a, b| a.key == b.key);

    tracing::debug!(
        count = objects.len(),
        prefixes = state.key_prefixes.len(),
        "Grouped listing built"
    );

    Ok(Json(ListObjectsResponse {
        success: true,
        objects,
        groups: Some(groups),
    }))
}
