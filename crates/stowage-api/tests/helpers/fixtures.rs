use axum_test::multipart::{MultipartForm, Part};

/// Multipart form with a single `file` part.
pub fn file_form(file_name: &str, mime_type: &str, data: &[u8]) -> MultipartForm {
    let part = Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part("file", part)
}

/// Deterministic payload larger than a single read chunk.
pub fn large_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
