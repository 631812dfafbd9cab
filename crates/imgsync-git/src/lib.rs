//! Working-copy lifecycle and remote synchronization
//!
//! A project's working copy is a plain git checkout under the upload
//! directory. [`RepositorySynchronizer`] brings it from whatever state it is
//! found in to a pushed commit, driving the `git` binary through the
//! declarative [`GitStep`] table.

pub mod error;
pub mod marker;
pub mod remote;
pub mod state;
pub mod steps;
pub mod synchronizer;

pub use error::{Error, Result};
pub use marker::BuildMarker;
pub use remote::{RemoteHost, RemoteLocation};
pub use state::WorkingCopyState;
pub use steps::{FailureClass, GitStep};
pub use synchronizer::{
    GitIdentity, RepositorySynchronizer, SyncConfig, SyncMode, SyncOutcome, WorkingCopyPopulator,
};
