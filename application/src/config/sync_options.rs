//! Snapshot publication options.

/// Controls how a session's state is turned into outgoing snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Replace vote values with `Empty` in snapshots taken while voting.
    /// The session itself always keeps the real values.
    pub conceal_votes_while_voting: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            conceal_votes_while_voting: true,
        }
    }
}

impl SyncOptions {
    pub fn with_conceal_votes(mut self, conceal: bool) -> Self {
        self.conceal_votes_while_voting = conceal;
        self
    }
}
