//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod server;
mod session;
mod sync;

pub use server::FileServerConfig;
pub use session::FileSessionConfig;
pub use sync::FileSyncConfig;

use poker_domain::VoteValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("server.port cannot be 0")]
    InvalidPort,

    #[error("session.consensus_threshold must be within 1..=100, got {0}")]
    InvalidThreshold(f64),

    #[error("session.name_prefix cannot be empty")]
    EmptyNamePrefix,

    #[error("session.cards cannot be empty")]
    EmptyDeck,

    #[error("session.cards: invalid card label {0:?}")]
    InvalidCard(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Listener and CORS settings
    pub server: FileServerConfig,
    /// Defaults for newly created sessions
    pub session: FileSessionConfig,
    /// Snapshot publication settings
    pub sync: FileSyncConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        let threshold = self.session.consensus_threshold;
        if !(1.0..=100.0).contains(&threshold) {
            return Err(ConfigValidationError::InvalidThreshold(threshold));
        }

        if self.session.name_prefix.trim().is_empty() {
            return Err(ConfigValidationError::EmptyNamePrefix);
        }

        if let Some(cards) = &self.session.cards {
            if cards.is_empty() {
                return Err(ConfigValidationError::EmptyDeck);
            }
            for card in cards {
                match card.parse::<VoteValue>() {
                    Ok(value) if !value.is_empty() => {}
                    _ => return Err(ConfigValidationError::InvalidCard(card.clone())),
                }
            }
        }

        Ok(())
    }
}
