use crate::constants::MSG_RETRIEVE_FAILED;
use crate::error::{HttpAppError, ResponseContext};
use crate::staging::StagedFileStream;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, Response, StatusCode},
};
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;
use stowage_core::constants::FALLBACK_CONTENT_TYPE;
use stowage_core::AppError;
use stowage_storage::keys::base_name;
use stowage_storage::ObjectDownload;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Download an object.
///
/// The object is first staged to a local file; headers are only sent once staging
/// succeeds, so any storage failure up to that point becomes a JSON 500. The staged file
/// is streamed back and removed when the body finishes, fails, or is dropped.
#[tracing::instrument(skip_all, fields(key = %key, operation = "download_object"))]
pub async fn download_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response<Body>, HttpAppError> {
    let ObjectDownload {
        content_type,
        mut stream,
        ..
    } = state
        .storage
        .get(&key)
        .await
        .with_message(MSG_RETRIEVE_FAILED)?;

    let filename = base_name(&key).unwrap_or("download").to_string();

    let (staging, mut file) = state
        .staging
        .create(&filename)
        .await
        .with_message(MSG_RETRIEVE_FAILED)?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_message(MSG_RETRIEVE_FAILED)?;
        file.write_all(&chunk).await.with_message(MSG_RETRIEVE_FAILED)?;
    }
    file.flush().await.with_message(MSG_RETRIEVE_FAILED)?;
    drop(file);

    let file = fs::File::open(staging.path())
        .await
        .with_message(MSG_RETRIEVE_FAILED)?;
    let size = file
        .metadata()
        .await
        .with_message(MSG_RETRIEVE_FAILED)?
        .len();

    tracing::debug!(
        size_bytes = size,
        path = %staging.path().display(),
        "Object staged for download"
    );

    let content_type = content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from_stream(StagedFileStream::new(file, staging)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
        .with_message(MSG_RETRIEVE_FAILED)?;

    Ok(response)
}

/// `attachment` disposition with an ASCII `filename` and, when the name needs it, an
/// RFC 5987 `filename*`.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if ascii == filename {
        format!("attachment; filename=\"{}\"", ascii)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            utf8_percent_encode(filename, NON_ALPHANUMERIC)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_name() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn quotes_are_replaced() {
        let value = content_disposition("my \"best\".txt");
        assert!(value.starts_with("attachment; filename=\"my _best_.txt\""));
        assert!(value.contains("filename*=UTF-8''my%20%22best%22%2Etxt"));
    }

    #[test]
    fn non_ascii_name_gets_extended_parameter() {
        let value = content_disposition("café.png");
        assert_eq!(
            value,
            "attachment; filename=\"caf_.png\"; filename*=UTF-8''caf%C3%A9%2Epng"
        );
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
