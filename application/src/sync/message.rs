//! Server-to-client messages
//!
//! On the wire these are `{"type": "snapshot", "data": {...}}` and
//! `{"type": "rejected", "data": {"kind": ..., "message": ..., "intent": ...}}`.

use poker_domain::{ErrorKind, SessionError, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Complete session state; shared between all receivers of a broadcast
    Snapshot(Arc<Snapshot>),
    /// An intent from this connection was refused
    Rejected(Rejection),
}

impl ServerMessage {
    pub fn rejected(error: &SessionError, intent: Option<&str>) -> Self {
        ServerMessage::Rejected(Rejection::new(error, intent))
    }

    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            ServerMessage::Snapshot(snapshot) => Some(snapshot),
            ServerMessage::Rejected(_) => None,
        }
    }
}

/// Why an intent was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub kind: ErrorKind,
    pub message: String,
    /// Wire name of the refused intent, when it could be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl Rejection {
    pub fn new(error: &SessionError, intent: Option<&str>) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            intent: intent.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejection_wire_shape() {
        let error = SessionError::invalid_phase("reveal_votes", "lobby");
        let message = ServerMessage::rejected(&error, Some("reveal_votes"));
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "rejected");
        assert_eq!(value["data"]["kind"], json!("invalid_phase_error"));
        assert_eq!(value["data"]["intent"], "reveal_votes");
        assert!(
            value["data"]["message"]
                .as_str()
                .unwrap()
                .contains("lobby")
        );
    }
}
