//! Settings resolution
//!
//! Settings are resolved once, at startup, and passed down explicitly.
//! Sources are applied in this order, later ones overriding earlier ones:
//!
//! 1. **Built-in defaults**
//! 2. **Config file** - optional `.toml`, `.json` or `.yaml` file
//! 3. **Environment** - `GIT_GROUP_NAME`, `GIT_HOST`, `IMGSYNC_REMOTE_ROOT`,
//!    `GIT_SSH_COMMAND`, `IMGSYNC_UPLOAD_DIR`
//! 4. **Command line** - applied by the caller on the returned value
//!
//! # Example
//!
//! ```ignore
//! use imgsync_core::config::Settings;
//!
//! let settings = Settings::resolve(Some(Path::new("imgsync.toml")))?;
//! settings.validate()?;
//! ```

mod settings;

pub use settings::{
    AuthorSettings, ENV_GROUP, ENV_HOST, ENV_REMOTE_ROOT, ENV_SSH_COMMAND, ENV_UPLOAD_DIR,
    MarkerSettings, RemoteSettings, Settings, TimeoutSettings, ToolSettings,
};
