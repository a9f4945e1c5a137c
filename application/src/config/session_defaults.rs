//! Defaults for sessions created on first attach.

use poker_domain::{CONSENSUS_THRESHOLD_PERCENT, ParticipantId, Session, SessionId, SessionSettings};

/// Settings applied to a session that does not exist yet when someone
/// attaches to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    /// The session is named `"{name_prefix} {session_id}"`.
    pub name_prefix: String,
    pub settings: SessionSettings,
    /// Percentage a single value must exceed to count as consensus.
    pub consensus_threshold: f64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            name_prefix: "Session".to_string(),
            settings: SessionSettings::default(),
            consensus_threshold: CONSENSUS_THRESHOLD_PERCENT,
        }
    }
}

impl SessionDefaults {
    // ==================== Builder Methods ====================

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    /// Build a fresh session owned by `owner`.
    pub fn new_session(&self, id: SessionId, owner: ParticipantId) -> Session {
        let name = format!("{} {}", self.name_prefix, id);
        Session::new(id, name, owner, self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_domain::SessionPhase;

    #[test]
    fn test_new_session_uses_prefix_and_settings() {
        let defaults = SessionDefaults::default()
            .with_name_prefix("Sprint")
            .with_settings(SessionSettings::default().with_auto_reveal(true));
        let session = defaults.new_session(SessionId::new("42"), ParticipantId::new("ada"));

        assert_eq!(session.name(), "Sprint 42");
        assert_eq!(session.moderator_id().as_str(), "ada");
        assert_eq!(session.phase(), SessionPhase::Lobby);
        assert!(session.settings().auto_reveal);
    }
}
