//! Round phase

use serde::{Deserialize, Serialize};

/// Phase of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No work item has been activated yet
    #[default]
    Lobby,
    /// Participants are casting hidden votes
    Voting,
    /// Votes are visible
    Revealing,
    /// Votes are visible and results are on display
    Results,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Lobby => "lobby",
            SessionPhase::Voting => "voting",
            SessionPhase::Revealing => "revealing",
            SessionPhase::Results => "results",
        }
    }

    /// Whether vote values may be shown and fed to statistics.
    ///
    /// `revealing` and `results` are equivalent here.
    pub fn votes_visible(&self) -> bool {
        matches!(self, SessionPhase::Revealing | SessionPhase::Results)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
