//! Upload requests and the temporary files their archives are staged into

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};

use crate::Result;

/// Where an uploaded archive's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Bytes already received, e.g. from a multipart body
    Bytes(Vec<u8>),
    /// A file the caller owns; it is copied, never moved or deleted
    File(PathBuf),
}

/// One archive as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUpload {
    /// Original file name, kept for diagnostics
    pub file_name: String,
    pub source: UploadSource,
}

impl ArchiveUpload {
    pub fn bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: UploadSource::Bytes(bytes.into()),
        }
    }

    /// Upload the file at `path` under its own file name.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        Self {
            file_name,
            source: UploadSource::File(path),
        }
    }

    fn is_empty(&self) -> Result<bool> {
        match &self.source {
            UploadSource::Bytes(bytes) => Ok(bytes.is_empty()),
            UploadSource::File(path) => {
                let meta = fs::metadata(path).map_err(|e| imgsync_fs::Error::io(path, e))?;
                Ok(meta.len() == 0)
            }
        }
    }
}

/// A project name plus its archives, in upload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub project: String,
    pub archives: Vec<ArchiveUpload>,
}

impl UploadRequest {
    pub fn new(project: impl Into<String>, archives: Vec<ArchiveUpload>) -> Self {
        Self {
            project: project.into(),
            archives,
        }
    }

    /// Copy every non-empty archive into its own temporary file under `dir`.
    ///
    /// Empty archives are skipped with a warning. On error, blobs staged so
    /// far are deleted as they drop.
    pub fn stage(&self, dir: &Path) -> Result<Vec<ArchiveBlob>> {
        fs::create_dir_all(dir).map_err(|e| imgsync_fs::Error::io(dir, e))?;

        let mut blobs = Vec::with_capacity(self.archives.len());
        for upload in &self.archives {
            if upload.is_empty()? {
                tracing::warn!(
                    project = %self.project,
                    file = %upload.file_name,
                    "Skipping empty upload"
                );
                continue;
            }
            blobs.push(ArchiveBlob::stage(upload, dir)?);
        }
        Ok(blobs)
    }
}

/// A staged archive. The file is deleted on [`ArchiveBlob::discard`] or drop.
#[derive(Debug)]
pub struct ArchiveBlob {
    file_name: String,
    path: TempPath,
}

impl ArchiveBlob {
    fn stage(upload: &ArchiveUpload, dir: &Path) -> Result<Self> {
        let suffix = format!("_{}", safe_file_name(&upload.file_name));
        let mut temp = Builder::new()
            .prefix("upload_")
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| imgsync_fs::Error::io(dir, e))?;

        let written = match &upload.source {
            UploadSource::Bytes(bytes) => temp.write_all(bytes).map(|()| bytes.len() as u64),
            UploadSource::File(source) => {
                File::open(source).and_then(|mut file| io::copy(&mut file, temp.as_file_mut()))
            }
        }
        .and_then(|n| temp.as_file().sync_all().map(|()| n))
        .map_err(|e| imgsync_fs::Error::io(temp.path(), e))?;

        tracing::debug!(
            file = %upload.file_name,
            staged = %temp.path().display(),
            bytes = written,
            "Staged upload"
        );
        Ok(Self {
            file_name: upload.file_name.clone(),
            path: temp.into_temp_path(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file now, logging instead of failing.
    pub fn discard(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete staged upload");
        }
    }
}

/// Last path component of an uploaded name, with anything unusual replaced.
fn safe_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "archive".to_string()
    } else {
        cleaned
    }
}
