//! Configuration file loading for planning-poker
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `POKER_SECTION__KEY` (e.g. `POKER_SERVER__PORT=9000`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./poker.toml` or `./.poker.toml`
//! 4. Global: `$XDG_CONFIG_HOME/planning-poker/config.toml`
//!    (fallback `~/.config/planning-poker/config.toml`)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileServerConfig, FileSessionConfig, FileSyncConfig,
};
pub use loader::ConfigLoader;
