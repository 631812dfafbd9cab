//! Firmware archive extraction and embedded package decoding
//!
//! - [`ArchiveExtractor`] unpacks an uploaded partition archive with 7z
//! - [`PackageDecoder`] finds APKs under `system/` and `vendor/`, decodes each
//!   with apktool into a scratch directory and publishes it under a name
//!   derived from its manifest
//! - [`Unpacker`] runs both over one project root

pub mod decoder;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod unpacker;

pub use decoder::{DecodedPackage, PackageDecoder};
pub use error::{Error, Result};
pub use extractor::ArchiveExtractor;
pub use unpacker::{Population, Unpacker};
