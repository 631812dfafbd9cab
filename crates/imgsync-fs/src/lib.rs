//! Filesystem primitives for imgsync
//!
//! Everything the pipeline does to a working copy on disk goes through here:
//! staged directory publishing, selective wipes, deterministic walks and the
//! per-project advisory lock.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;
pub mod tree;

pub use config::ConfigStore;
pub use constants::RepoPath;
pub use error::{Error, Result};
pub use lock::WorkingCopyLock;
pub use path::{absolute, validate_path_identifier};
pub use tree::{PublishMode, files_with_extension, publish_dir, remove_tree, remove_tree_best_effort, wipe_except};
