/// Collection route for listing and uploading objects.
pub const OBJECTS_PATH: &str = "/api/objects";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

pub const MSG_LIST_FAILED: &str = "Failed to list objects";
pub const MSG_UPLOAD_FAILED: &str = "Failed to upload file";
pub const MSG_UPLOAD_OK: &str = "File uploaded successfully";
pub const MSG_NO_FILE: &str = "No file uploaded";
pub const MSG_RETRIEVE_FAILED: &str = "Failed to retrieve object";
