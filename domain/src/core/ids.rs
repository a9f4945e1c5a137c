//! Identifiers used throughout the session model.
//!
//! All identifiers are opaque strings. Participant ids are asserted by the
//! client (supplied by its identity provider) and stay stable across
//! reconnects; work item ids are assigned by the session.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a session (the room code).
    SessionId
);

string_id!(
    /// Stable identity of a participant within a session.
    ParticipantId
);

string_id!(
    /// Identifier of a work item, unique within its session.
    WorkItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_transparent_on_the_wire() {
        let id = ParticipantId::new("user-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-1\"");

        let parsed: WorkItemId = serde_json::from_str("\"wi-3\"").unwrap();
        assert_eq!(parsed.as_str(), "wi-3");
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionId::from("demo-123").to_string(), "demo-123");
    }
}
