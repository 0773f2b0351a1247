use crate::constants::{MSG_NO_FILE, MSG_UPLOAD_FAILED, MSG_UPLOAD_OK, UPLOAD_FIELD};
use crate::error::{HttpAppError, ResponseContext};
use crate::staging::{StagingArea, StagingFile};
use crate::state::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use stowage_core::constants::FALLBACK_CONTENT_TYPE;
use stowage_core::AppError;
use stowage_storage::keys::upload_key;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub key: String,
}

/// The `file` part of an upload, already written to a staging file.
struct StagedUpload {
    staging: StagingFile,
    filename: String,
    content_type: String,
    size: u64,
}

#[tracing::instrument(skip_all, fields(operation = "upload_object"))]
pub async fn upload_object(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Upload request is not multipart");
        AppError::BadRequest(MSG_NO_FILE.to_string())
    })?;

    let Some(upload) = stage_file_part(&state.staging, multipart).await? else {
        return Err(AppError::BadRequest(MSG_NO_FILE.to_string()).into());
    };

    let StagedUpload {
        staging,
        filename,
        content_type,
        size,
    } = upload;

    let key = upload_key(state.upload_key_prefix.as_deref(), &filename)
        .with_message(MSG_UPLOAD_FAILED)?;

    let data = fs::read(staging.path())
        .await
        .with_message(MSG_UPLOAD_FAILED)?;

    state
        .storage
        .put(&key, &content_type, data)
        .await
        .with_message(MSG_UPLOAD_FAILED)?;

    staging.cleanup().await;

    tracing::info!(
        key = %key,
        size_bytes = size,
        content_type = %content_type,
        "Object uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: MSG_UPLOAD_OK.to_string(),
        key,
    }))
}

/// Stream the single `file` part into a staging file.
///
/// Returns `None` when the form carries no file part. Other fields are skipped; a second
/// file part is rejected.
async fn stage_file_part(
    staging: &StagingArea,
    mut multipart: Multipart,
) -> Result<Option<StagedUpload>, HttpAppError> {
    let mut staged: Option<StagedUpload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if staged.is_some() {
            return Err(AppError::BadRequest(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| mime_guess::from_path(&filename).first_raw().map(String::from))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let (staging_file, mut file) = staging
            .create(&filename)
            .await
            .with_message(MSG_UPLOAD_FAILED)?;

        let mut size = 0u64;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?
        {
            size += chunk.len() as u64;
            file.write_all(&chunk).await.with_message(MSG_UPLOAD_FAILED)?;
        }
        file.flush().await.with_message(MSG_UPLOAD_FAILED)?;

        tracing::debug!(
            filename = %filename,
            size_bytes = size,
            path = %staging_file.path().display(),
            "Upload staged"
        );

        staged = Some(StagedUpload {
            staging: staging_file,
            filename,
            content_type,
            size,
        });
    }

    Ok(staged)
}
