//! Vote entity

use super::value::VoteValue;
use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// A vote cast by a participant in the current round.
///
/// Votes are keyed by participant; casting again replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub participant_id: ParticipantId,
    #[serde(default)]
    pub value: VoteValue,
    /// Milliseconds since the Unix epoch
    pub cast_at: u64,
}

impl Vote {
    pub fn new(participant_id: ParticipantId, value: VoteValue, cast_at: u64) -> Self {
        Self {
            participant_id,
            value,
            cast_at,
        }
    }

    /// Copy of this vote with the value hidden, keeping presence and time.
    pub fn concealed(&self) -> Self {
        Self {
            participant_id: self.participant_id.clone(),
            value: VoteValue::Empty,
            cast_at: self.cast_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vote_serializes_camel_case() {
        let vote = Vote::new(ParticipantId::new("a"), VoteValue::Numeric(5.0), 42);
        assert_eq!(
            serde_json::to_value(&vote).unwrap(),
            json!({"participantId": "a", "value": 5, "castAt": 42})
        );
    }

    #[test]
    fn test_concealed_keeps_presence() {
        let vote = Vote::new(ParticipantId::new("a"), VoteValue::Numeric(5.0), 42);
        let hidden = vote.concealed();
        assert!(hidden.value.is_empty());
        assert_eq!(hidden.participant_id, vote.participant_id);
        assert_eq!(hidden.cast_at, 42);
    }
}
