//! Extraction followed by decoding, as one step over a project root

use std::path::{Path, PathBuf};

use crate::{ArchiveExtractor, DecodedPackage, PackageDecoder, Result};

/// What one population of a project root produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    /// Archives extracted into the root
    pub archives: usize,
    pub packages: Vec<DecodedPackage>,
}

/// Extracts a set of archives into a project root and decodes its packages.
#[derive(Debug, Clone)]
pub struct Unpacker {
    extractor: ArchiveExtractor,
    decoder: PackageDecoder,
}

impl Unpacker {
    pub fn new(extractor: ArchiveExtractor, decoder: PackageDecoder) -> Self {
        Self { extractor, decoder }
    }

    pub fn extractor(&self) -> &ArchiveExtractor {
        &self.extractor
    }

    pub fn decoder(&self) -> &PackageDecoder {
        &self.decoder
    }

    /// Extract `archives` in order, then decode every package found.
    ///
    /// The first failure aborts; nothing already written is rolled back.
    pub async fn unpack(&self, archives: &[PathBuf], project_root: &Path) -> Result<Population> {
        let extracted = self.extractor.extract_all(archives, project_root).await?;
        let packages = self.decoder.decode_all(project_root).await?;
        tracing::info!(
            root = %project_root.display(),
            archives = extracted,
            packages = packages.len(),
            "Project root populated"
        );
        Ok(Population {
            archives: extracted,
            packages,
        })
    }
}
