//! Dataset id validation.
//!
//! Valid dataset ids:
//! - Must be non-empty
//! - May contain ASCII letters, digits, `-`, `_`, and `/`
//! - Must not start or end with `/`
//! - Must not contain consecutive slashes (`//`)

use crate::error::{DatasError, DatasResult};

/// Validate a dataset id, returning `Ok(())` if valid.
///
/// Ids follow a simple hierarchical convention (`main`,
/// `releases/v1`) to keep them unambiguous in tooling and on disk.
///
/// # Examples
///
/// ```
/// use grove_datas::validate_dataset_id;
///
/// assert!(validate_dataset_id("main").is_ok());
/// assert!(validate_dataset_id("releases/v1").is_ok());
/// assert!(validate_dataset_id("").is_err());
/// assert!(validate_dataset_id("has space").is_err());
/// ```
pub fn validate_dataset_id(id: &str) -> DatasResult<()> {
    if id.is_empty() {
        return Err(invalid(id, "dataset id must not be empty"));
    }

    for ch in id.chars() {
        if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '/') {
            return Err(invalid(id, &format!("contains forbidden character: {ch:?}")));
        }
    }

    if id.starts_with('/') || id.ends_with('/') {
        return Err(invalid(id, "must not start or end with '/'"));
    }

    if id.contains("//") {
        return Err(invalid(id, "must not contain consecutive slashes '//'"));
    }

    Ok(())
}

fn invalid(name: &str, reason: &str) -> DatasError {
    DatasError::InvalidDatasetId {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
