//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an intent is rejected by the session.
///
/// Every variant leaves the session untouched; the rejection is reported
/// to the originating caller only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Not allowed in phase {phase}: {operation}")]
    InvalidPhase { operation: String, phase: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed intent: {0}")]
    MalformedIntent(String),
}

impl SessionError {
    pub fn authorization(detail: impl Into<String>) -> Self {
        SessionError::Authorization(detail.into())
    }

    pub fn invalid_phase(operation: impl Into<String>, phase: impl std::fmt::Display) -> Self {
        SessionError::InvalidPhase {
            operation: operation.into(),
            phase: phase.to_string(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        SessionError::NotFound(detail.into())
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        SessionError::MalformedIntent(detail.into())
    }

    /// Stable category reported to clients alongside the message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Authorization(_) => ErrorKind::AuthorizationError,
            SessionError::InvalidPhase { .. } => ErrorKind::InvalidPhaseError,
            SessionError::NotFound(_) => ErrorKind::NotFoundError,
            SessionError::MalformedIntent(_) => ErrorKind::MalformedIntentError,
        }
    }
}

/// Wire-level category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthorizationError,
    InvalidPhaseError,
    NotFoundError,
    MalformedIntentError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthorizationError => "authorization_error",
            ErrorKind::InvalidPhaseError => "invalid_phase_error",
            ErrorKind::NotFoundError => "not_found_error",
            ErrorKind::MalformedIntentError => "malformed_intent_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SessionError::invalid_phase("cast_vote", "lobby");
        assert_eq!(error.to_string(), "Not allowed in phase lobby: cast_vote");

        let error = SessionError::not_found("work item wi-9");
        assert_eq!(error.to_string(), "Not found: work item wi-9");
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            SessionError::authorization("x").kind(),
            ErrorKind::AuthorizationError
        );
        assert_eq!(
            SessionError::malformed("x").kind(),
            ErrorKind::MalformedIntentError
        );
        assert_eq!(ErrorKind::NotFoundError.to_string(), "not_found_error");
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidPhaseError).unwrap();
        assert_eq!(json, "\"invalid_phase_error\"");
    }
}
