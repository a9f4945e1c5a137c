//! Participants

use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// What a participant may do in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// Controls the round: work items, reveal, clear, kick
    Moderator,
    /// Casts votes
    Voter,
    /// Watches only
    Observer,
}

impl ParticipantRole {
    pub fn can_vote(&self) -> bool {
        !matches!(self, ParticipantRole::Observer)
    }
}

/// Connection state of a participant as seen by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Idle,
}

/// Job category shown next to a participant.
///
/// Unknown labels fall back to `Developer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobCategory {
    Admin,
    Product,
    #[default]
    Developer,
    Qa,
}

impl JobCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Admin => "Admin",
            JobCategory::Product => "Product",
            JobCategory::Developer => "Developer",
            JobCategory::Qa => "QA",
        }
    }

    /// Lenient parse; anything unrecognised becomes `Developer`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "admin" => JobCategory::Admin,
            "product" => JobCategory::Product,
            "qa" => JobCategory::Qa,
            _ => JobCategory::Developer,
        }
    }
}

impl From<String> for JobCategory {
    fn from(label: String) -> Self {
        JobCategory::parse_lenient(&label)
    }
}

impl From<JobCategory> for String {
    fn from(category: JobCategory) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for JobCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity asserted by a client when it attaches to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub id: ParticipantId,
    pub display_name: String,
    #[serde(default)]
    pub job_category: JobCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ParticipantProfile {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            job_category: JobCategory::default(),
            avatar_url: None,
        }
    }

    pub fn with_job_category(mut self, job_category: JobCategory) -> Self {
        self.job_category = job_category;
        self
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// A member of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub job_category: JobCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: ParticipantRole,
    pub connection_status: ConnectionStatus,
    /// Mirrors whether a vote is present for this participant in the round
    pub has_voted: bool,
}

impl Participant {
    pub(crate) fn from_profile(profile: ParticipantProfile, role: ParticipantRole) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            job_category: profile.job_category,
            avatar_url: profile.avatar_url,
            role,
            connection_status: ConnectionStatus::Connected,
            has_voted: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_category_lenient() {
        assert_eq!(JobCategory::parse_lenient("QA"), JobCategory::Qa);
        assert_eq!(JobCategory::parse_lenient("product"), JobCategory::Product);
        assert_eq!(JobCategory::parse_lenient("Designer"), JobCategory::Developer);

        let parsed: JobCategory = serde_json::from_str("\"Astronaut\"").unwrap();
        assert_eq!(parsed, JobCategory::Developer);
        assert_eq!(serde_json::to_string(&JobCategory::Qa).unwrap(), "\"QA\"");
    }

    #[test]
    fn test_observer_cannot_vote() {
        assert!(ParticipantRole::Moderator.can_vote());
        assert!(ParticipantRole::Voter.can_vote());
        assert!(!ParticipantRole::Observer.can_vote());
    }

    #[test]
    fn test_participant_wire_shape() {
        let p = Participant::from_profile(
            ParticipantProfile::new("u1", "Ada"),
            ParticipantRole::Voter,
        );
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["displayName"], "Ada");
        assert_eq!(json["connectionStatus"], "connected");
        assert_eq!(json["hasVoted"], false);
        assert!(json.get("avatarUrl").is_none());
    }
}
