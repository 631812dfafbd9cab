//! Pipeline mode
//!
//! The canonical definition lives in `imgsync-git`, whose synchronizer is
//! what actually branches on it. This alias keeps the short `Mode` name used
//! by the orchestrator and the CLI.

/// Publish or update (type alias for [`imgsync_git::SyncMode`]).
pub type Mode = imgsync_git::SyncMode;
