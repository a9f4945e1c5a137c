//! Sync configuration from TOML (`[sync]` section)

use poker_application::SyncOptions;
use serde::{Deserialize, Serialize};

/// Raw sync configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSyncConfig {
    /// Hide vote values in snapshots until the round is revealed
    pub conceal_votes_while_voting: bool,
}

impl Default for FileSyncConfig {
    fn default() -> Self {
        Self {
            conceal_votes_while_voting: true,
        }
    }
}

impl FileSyncConfig {
    pub fn to_options(&self) -> SyncOptions {
        SyncOptions::default().with_conceal_votes(self.conceal_votes_while_voting)
    }
}
