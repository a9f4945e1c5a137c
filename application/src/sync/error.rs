//! Synchronizer errors

use super::hub::ConnectionId;
use poker_domain::{SessionError, SessionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Connection {0} is not attached")]
    NotAttached(ConnectionId),

    #[error("Session not found: {0}")]
    UnknownSession(SessionId),

    #[error("Connection closed")]
    Closed,
}

impl SyncError {
    /// The session-level error behind this one, if any
    pub fn as_session_error(&self) -> Option<&SessionError> {
        match self {
            SyncError::Session(e) => Some(e),
            _ => None,
        }
    }
}
