//! Pipeline orchestration for imgsync
//!
//! This crate ties the lower crates together for one upload request:
//!
//! - **Settings**: defaults, config file and environment, resolved once
//! - **Upload staging**: archives copied to temporary blobs that never outlive a run
//! - **Provisioning seam**: a hook to create the remote project before pushing
//! - **PipelineOrchestrator**: extraction, decoding and synchronization in
//!   publish or update mode, with a [`RunReport`] on success
//!
//! # Architecture
//!
//! ```text
//!                     imgsync-cli
//!                          |
//!                     imgsync-core
//!                          |
//!        +-----------------+----------------+
//!        |                 |                |
//!   imgsync-git      imgsync-unpack    imgsync-process
//!        |                 |
//!        +--------+--------+
//!                 |
//!            imgsync-fs
//! ```

pub mod config;
pub mod error;
pub mod mode;
pub mod orchestrator;
pub mod provision;
pub mod upload;

pub use config::Settings;
pub use error::{Error, FailureKind, Result};
pub use mode::Mode;
pub use orchestrator::{PipelineOrchestrator, RunReport};
pub use provision::{NoopProvisioner, ProjectProvisioner};
pub use upload::{ArchiveBlob, ArchiveUpload, UploadRequest, UploadSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_message() {
        let error = Error::Config {
            message: "remote group is not set".into(),
        };

        let display = format!("{}", error);
        assert!(
            display.contains("remote group is not set"),
            "Error display should contain the message, got: {}",
            display
        );
        assert_eq!(error.kind(), FailureKind::Config);
    }
}
