//! External tool invocation for imgsync
//!
//! Every archiver, decoder and git call goes through this crate:
//!
//! - [`ToolInvocation`] describes one call (program, arguments, environment,
//!   deadline)
//! - [`run`] spawns it, drains stdout and stderr into one buffer in arrival
//!   order, and kills the child if the deadline passes or the future is
//!   dropped
//! - [`FailurePolicy`] decides whether a nonzero exit aborts the run or is
//!   logged and tolerated

pub mod discovery;
pub mod error;
pub mod invocation;
pub mod policy;
pub mod runner;

pub use discovery::find_tool;
pub use error::{Error, Result};
pub use invocation::{ToolInvocation, ToolOutput};
pub use policy::{FailurePolicy, StepOutcome};
pub use runner::{run, run_with_policy};
