//! Package identifiers from decoded manifests
//!
//! The identifier is read from the `package` attribute of the root
//! `<manifest>` element. When that attribute cannot be read (the XML is
//! malformed, the root is something else or the attribute is missing) the
//! first textual `package="..."` match wins, and when neither finds anything the placeholder
//! [`PLACEHOLDER_PACKAGE`] is used. Published directory names depend on this
//! fallback chain, so it must stay stable.

use std::path::Path;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

/// Identifier used when a manifest names no package
pub const PLACEHOLDER_PACKAGE: &str = "unknown.package";

static PACKAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"package\s*=\s*"([^"]+)""#).unwrap());

static UNSAFE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\\/\s:]+").unwrap());

/// `package` attribute of the root `<manifest>` element, taken verbatim.
fn read_root_package(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                if e.local_name().as_ref() != b"manifest" {
                    return None;
                }
                return e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref() == b"package")
                    .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(str::to_string))
                    .filter(|value| !value.trim().is_empty());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// First `package="..."` occurrence anywhere in the text.
pub fn textual_package(text: &str) -> Option<String> {
    PACKAGE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Package identifier of a decoded manifest, or [`PLACEHOLDER_PACKAGE`].
pub fn package_id(manifest: &str) -> String {
    read_root_package(manifest)
        .or_else(|| textual_package(manifest))
        .unwrap_or_else(|| PLACEHOLDER_PACKAGE.to_string())
}

/// Replace each run of path separators, whitespace or `:` with one `_`.
pub fn sanitize(id: &str) -> String {
    UNSAFE_RUN.replace_all(id, "_").into_owned()
}

/// File name up to its last `.`; a leading dot is part of the name.
pub fn archive_basename(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name,
    }
}

/// Published directory name: `<sanitized-id>_<archive-basename>`.
pub fn final_dir_name(package_id: &str, basename: &str) -> String {
    format!("{}_{}", sanitize(package_id), basename)
}
