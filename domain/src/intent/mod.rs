//! Client intents
//!
//! An intent is a client's request to change the session. On the wire it is
//! a tagged record:
//!
//! ```json
//! {"type": "cast_vote", "payload": {"value": 5}}
//! ```
//!
//! [`IntentFrame`] is that raw record; [`Intent::try_from`] validates its
//! payload and turns structural problems into
//! [`SessionError::MalformedIntent`] before anything reaches the session.

use crate::core::error::SessionError;
use crate::core::ids::{ParticipantId, WorkItemId};
use crate::session::{JobCategory, ParticipantProfile, SettingsUpdate, WorkItemDraft};
use crate::vote::VoteValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Raw `{type, payload}` record as received from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

/// Profile fields a participant may re-assert with a `join` intent.
///
/// The participant id always comes from the connection, never the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default, alias = "jobRole")]
    pub job_category: JobCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl JoinRequest {
    pub fn into_profile(self, id: ParticipantId) -> ParticipantProfile {
        ParticipantProfile {
            id,
            display_name: self.display_name,
            job_category: self.job_category,
            avatar_url: self.avatar_url,
        }
    }
}

/// A validated client intent
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Join(JoinRequest),
    CastVote {
        value: VoteValue,
    },
    RevealVotes,
    ShowResults,
    ClearVotes,
    AddWorkItem(WorkItemDraft),
    SetActiveWorkItem {
        work_item_id: WorkItemId,
    },
    SetAgreedEstimate {
        work_item_id: WorkItemId,
        estimate: VoteValue,
    },
    KickParticipant {
        participant_id: ParticipantId,
    },
    UpdateSettings(SettingsUpdate),
    Leave,
}

#[derive(Deserialize)]
struct CastVotePayload {
    value: VoteValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkItemRef {
    #[serde(alias = "id")]
    work_item_id: WorkItemId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgreedEstimatePayload {
    #[serde(alias = "id")]
    work_item_id: WorkItemId,
    #[serde(default, alias = "value")]
    estimate: VoteValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KickPayload {
    #[serde(alias = "userId")]
    participant_id: ParticipantId,
}

impl Intent {
    /// Wire name of this intent
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Join(_) => "join",
            Intent::CastVote { .. } => "cast_vote",
            Intent::RevealVotes => "reveal_votes",
            Intent::ShowResults => "show_results",
            Intent::ClearVotes => "clear_votes",
            Intent::AddWorkItem(_) => "add_work_item",
            Intent::SetActiveWorkItem { .. } => "set_active_work_item",
            Intent::SetAgreedEstimate { .. } => "set_agreed_estimate",
            Intent::KickParticipant { .. } => "kick_participant",
            Intent::UpdateSettings(_) => "update_settings",
            Intent::Leave => "leave",
        }
    }

    /// Encode as a `{type, payload}` record.
    pub fn to_frame(&self) -> IntentFrame {
        let payload = match self {
            Intent::Join(request) => json!(request),
            Intent::CastVote { value } => json!({ "value": value }),
            Intent::AddWorkItem(draft) => json!(draft),
            Intent::SetActiveWorkItem { work_item_id } => json!({ "workItemId": work_item_id }),
            Intent::SetAgreedEstimate {
                work_item_id,
                estimate,
            } => json!({ "workItemId": work_item_id, "estimate": estimate }),
            Intent::KickParticipant { participant_id } => {
                json!({ "participantId": participant_id })
            }
            Intent::UpdateSettings(update) => json!(update),
            Intent::RevealVotes | Intent::ShowResults | Intent::ClearVotes | Intent::Leave => {
                json!({})
            }
        };
        IntentFrame {
            kind: self.name().to_string(),
            payload,
        }
    }
}

impl TryFrom<IntentFrame> for Intent {
    type Error = SessionError;

    fn try_from(frame: IntentFrame) -> Result<Self, Self::Error> {
        let IntentFrame { kind, payload } = frame;
        let intent = match kind.as_str() {
            // "join_session" is what older clients send
            "join" | "join_session" => Intent::Join(parse_payload(&kind, payload)?),
            "cast_vote" => {
                let p: CastVotePayload = parse_payload(&kind, payload)?;
                Intent::CastVote { value: p.value }
            }
            "reveal_votes" => Intent::RevealVotes,
            "show_results" => Intent::ShowResults,
            "clear_votes" => Intent::ClearVotes,
            "add_work_item" => Intent::AddWorkItem(parse_payload(&kind, payload)?),
            "set_active_work_item" => {
                let p: WorkItemRef = parse_payload(&kind, payload)?;
                Intent::SetActiveWorkItem {
                    work_item_id: p.work_item_id,
                }
            }
            "set_agreed_estimate" => {
                let p: AgreedEstimatePayload = parse_payload(&kind, payload)?;
                Intent::SetAgreedEstimate {
                    work_item_id: p.work_item_id,
                    estimate: p.estimate,
                }
            }
            "kick_participant" => {
                let p: KickPayload = parse_payload(&kind, payload)?;
                Intent::KickParticipant {
                    participant_id: p.participant_id,
                }
            }
            "update_settings" => Intent::UpdateSettings(parse_payload(&kind, payload)?),
            "leave" => Intent::Leave,
            other => {
                return Err(SessionError::malformed(format!(
                    "unknown intent type: {}",
                    other
                )));
            }
        };
        Ok(intent)
    }
}

fn parse_payload<T: DeserializeOwned>(kind: &str, payload: Value) -> Result<T, SessionError> {
    let payload = if payload.is_null() { json!({}) } else { payload };
    serde_json::from_value(payload)
        .map_err(|e| SessionError::malformed(format!("{}: {}", kind, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::Sentinel;

    fn decode(value: Value) -> Result<Intent, SessionError> {
        let frame: IntentFrame = serde_json::from_value(value).unwrap();
        Intent::try_from(frame)
    }

    #[test]
    fn test_decode_cast_vote() {
        let intent = decode(json!({"type": "cast_vote", "payload": {"value": 5}})).unwrap();
        assert_eq!(intent, Intent::CastVote { value: VoteValue::Numeric(5.0) });

        let intent = decode(json!({"type": "cast_vote", "payload": {"value": "coffee"}})).unwrap();
        assert_eq!(
            intent,
            Intent::CastVote {
                value: VoteValue::Sentinel(Sentinel::NeedsBreak)
            }
        );

        let intent = decode(json!({"type": "cast_vote", "payload": {"value": null}})).unwrap();
        assert_eq!(intent, Intent::CastVote { value: VoteValue::Empty });
    }

    #[test]
    fn test_payloadless_intents() {
        assert_eq!(decode(json!({"type": "reveal_votes"})).unwrap(), Intent::RevealVotes);
        assert_eq!(
            decode(json!({"type": "clear_votes", "payload": {}})).unwrap(),
            Intent::ClearVotes
        );
        assert_eq!(
            decode(json!({"type": "leave", "payload": null})).unwrap(),
            Intent::Leave
        );
    }

    #[test]
    fn test_decode_aliases() {
        let intent = decode(json!({
            "type": "kick_participant",
            "payload": {"userId": "bob"}
        }))
        .unwrap();
        assert_eq!(
            intent,
            Intent::KickParticipant {
                participant_id: ParticipantId::new("bob")
            }
        );

        let intent = decode(json!({
            "type": "join_session",
            "payload": {"name": "Ada", "jobRole": "QA"}
        }))
        .unwrap();
        match intent {
            Intent::Join(req) => {
                assert_eq!(req.display_name, "Ada");
                assert_eq!(req.job_category, JobCategory::Qa);
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payloads() {
        let err = decode(json!({"type": "cast_vote", "payload": {}})).unwrap_err();
        assert!(matches!(err, SessionError::MalformedIntent(_)));

        let err = decode(json!({"type": "cast_vote", "payload": {"value": "banana"}})).unwrap_err();
        assert!(matches!(err, SessionError::MalformedIntent(_)));

        let err = decode(json!({"type": "set_active_work_item", "payload": {}})).unwrap_err();
        assert!(err.to_string().contains("set_active_work_item"));

        let err = decode(json!({"type": "dance"})).unwrap_err();
        assert!(matches!(err, SessionError::MalformedIntent(_)));
    }

    #[test]
    fn test_frame_encoding_decodes_back() {
        let intents = vec![
            Intent::AddWorkItem(WorkItemDraft::new("Login").with_description("OAuth")),
            Intent::SetAgreedEstimate {
                work_item_id: WorkItemId::new("wi-1"),
                estimate: VoteValue::Numeric(8.0),
            },
            Intent::ShowResults,
        ];
        for intent in intents {
            let frame = intent.to_frame();
            assert_eq!(frame.kind, intent.name());
            assert_eq!(Intent::try_from(frame).unwrap(), intent);
        }
    }
}
