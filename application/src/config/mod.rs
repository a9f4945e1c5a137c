//! Application-level configuration.
//!
//! - [`SessionDefaults`]: how sessions created on first attach look
//! - [`SyncOptions`]: how the synchronizer publishes snapshots

pub mod session_defaults;
pub mod sync_options;

pub use session_defaults::SessionDefaults;
pub use sync_options::SyncOptions;
