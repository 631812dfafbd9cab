//! SHA-256 digests used to derive stable scratch names

use sha2::{Digest, Sha256};
use std::path::Path;

/// Number of hex digits kept by [`short_digest`]
const SHORT_LEN: usize = 16;

/// Full lowercase hex SHA-256 of string content.
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// First 16 hex digits of the SHA-256 of a path's textual form.
///
/// Stable across runs for the same path, which lets a retry find the scratch
/// directory a failed attempt left behind.
pub fn short_digest(path: &Path) -> String {
    let mut digest = content_digest(&path.to_string_lossy());
    digest.truncate(SHORT_LEN);
    digest
}
