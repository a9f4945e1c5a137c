//! JSON frame codec

use super::error::TransportError;
use poker_application::ServerMessage;
use poker_domain::{Intent, IntentFrame, SessionError};

/// Decode an inbound text frame into a validated intent.
pub fn decode_intent(text: &str) -> Result<Intent, SessionError> {
    let frame: IntentFrame = serde_json::from_str(text)
        .map_err(|e| SessionError::malformed(format!("invalid frame: {}", e)))?;
    Intent::try_from(frame)
}

pub fn encode_message(message: &ServerMessage) -> Result<String, TransportError> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_domain::{
        ParticipantId, Session, SessionId, SessionSettings, Snapshot, VoteValue,
    };
    use serde_json::Value;
    use std::sync::Arc;

    #[test]
    fn test_decode_intent() {
        let intent = decode_intent(r#"{"type":"cast_vote","payload":{"value":"?"}}"#).unwrap();
        assert_eq!(
            intent,
            Intent::CastVote {
                value: "?".parse::<VoteValue>().unwrap()
            }
        );
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        for text in ["not json", "[]", r#"{"payload":{}}"#] {
            let err = decode_intent(text).unwrap_err();
            assert!(matches!(err, SessionError::MalformedIntent(_)), "{}", text);
        }
    }

    #[test]
    fn test_encode_snapshot_frame() {
        let session = Session::new(
            SessionId::new("room"),
            "Session room",
            ParticipantId::new("m"),
            SessionSettings::default(),
        );
        let message = ServerMessage::Snapshot(Arc::new(Snapshot::new(session, 5, 1)));
        let value: Value = serde_json::from_str(&encode_message(&message).unwrap()).unwrap();

        assert_eq!(value["type"], "snapshot");
        assert_eq!(value["data"]["sequenceId"], 1);
        assert_eq!(value["data"]["generatedAt"], 5);
        assert_eq!(value["data"]["session"]["phase"], "lobby");
        assert_eq!(value["data"]["session"]["name"], "Session room");
    }
}
