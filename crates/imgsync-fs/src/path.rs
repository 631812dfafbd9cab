//! Path helpers for working-copy roots and tool arguments

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Validate a name that becomes a single directory component.
///
/// Project names are joined onto the upload directory, so anything that
/// could escape it or span several components is rejected.
pub fn validate_path_identifier(value: &str) -> Result<()> {
    let reason = if value.trim().is_empty() {
        Some("must not be empty")
    } else if value == "." || value == ".." {
        Some("must not be a relative directory marker")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value.contains('\0') {
        Some("must not contain NUL bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidIdentifier {
            value: value.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Absolute, simplified form of a path that may not exist yet.
///
/// External tools are always handed absolute paths because they run with
/// their own working directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    Ok(dunce::simplified(&abs).to_path_buf())
}
