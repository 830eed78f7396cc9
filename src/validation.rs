//! Input validation for page paths supplied by callers.

use crate::error::{FlatPagesError, Result};

/// Maximum allowed length for a logical page path.
pub const MAX_PATH_LENGTH: usize = 255;

/// Characters forbidden in page paths.
const FORBIDDEN_PATH_CHARS: &[char] = &['\\', '\0'];

/// Validates a logical page path before it is turned into a file name.
///
/// Paths are `/`-separated and relative to the page root; they may not
/// climb out of it.
pub fn validate_page_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FlatPagesError::Validation("Path cannot be empty".to_string()));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(FlatPagesError::Validation(format!(
            "Path exceeds maximum length of {} characters",
            MAX_PATH_LENGTH
        )));
    }
    if path.starts_with('/') {
        return Err(FlatPagesError::Validation(
            "Path must be relative to the page root".to_string(),
        ));
    }
    for c in FORBIDDEN_PATH_CHARS {
        if path.contains(*c) {
            return Err(FlatPagesError::Validation(format!(
                "Path cannot contain {:?}",
                c
            )));
        }
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(FlatPagesError::Validation(format!(
                "Path '{}' has an empty segment",
                path
            )));
        }
        if segment == ".." || segment == "." {
            return Err(FlatPagesError::Validation(format!(
                "Path cannot contain '{}' (path traversal)",
                segment
            )));
        }
    }
    Ok(())
}
