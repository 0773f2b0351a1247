//! Shared key helpers for storage backends and the HTTP layer.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that are empty, absolute, or contain a `..` segment.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid path segments: {}",
            key
        )));
    }
    Ok(())
}

/// Last path component of a key or filename, ignoring both `/` and `\` separators.
///
/// Returns `None` when nothing usable is left (empty, `.` or `..`).
pub fn base_name(name: &str) -> Option<&str> {
    name.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// Build the key for an uploaded file: `{prefix}{basename}`.
pub fn upload_key(prefix: Option<&str>, filename: &str) -> StorageResult<String> {
    let name = base_name(filename).ok_or_else(|| {
        StorageError::InvalidKey(format!("Filename has no usable base name: {}", filename))
    })?;
    let key = match prefix {
        Some(prefix) => format!("{}{}", prefix, name),
        None => name.to_string(),
    };
    validate_key(&key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_rejects_traversal() {
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("original/cat.png").is_ok());
        assert!(validate_key("weird..name.txt").is_ok());
    }

    #[test]
    fn base_name_strips_directories() {
        assert_eq!(base_name("original/cat.png"), Some("cat.png"));
        assert_eq!(base_name("C:\\Users\\me\\report.pdf"), Some("report.pdf"));
        assert_eq!(base_name("plain.txt"), Some("plain.txt"));
        assert_eq!(base_name("dir/"), None);
        assert_eq!(base_name(".."), None);
    }

    #[test]
    fn upload_key_applies_prefix() {
        assert_eq!(upload_key(None, "cat.png").unwrap(), "cat.png");
        assert_eq!(
            upload_key(Some("original/"), "../../cat.png").unwrap(),
            "original/cat.png"
        );
        assert!(upload_key(Some("original/"), "..").is_err());
    }
}
