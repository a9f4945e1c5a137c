//! Client connection port
//!
//! Defines how a client (a person's browser, a simulated peer) attaches to a
//! session and sends intents. Implementations decide whether the session
//! lives in the same process or across a socket.

use crate::client::SessionStore;
use crate::sync::SyncError;
use async_trait::async_trait;
use poker_domain::{Intent, ParticipantId, ParticipantProfile, SessionId};
use std::sync::Arc;

/// Sends intents for one attached participant.
#[async_trait]
pub trait IntentSender: Send + Sync {
    /// Submit an intent.
    ///
    /// Implementations that can observe the outcome return the rejection as
    /// an error; others return `Ok` once the intent is on its way and report
    /// rejections through the connection's message stream.
    async fn send(&self, intent: Intent) -> Result<(), SyncError>;

    /// Detach from the session.
    async fn close(&self);
}

/// Opens client connections to sessions.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(
        &self,
        session_id: &SessionId,
        profile: ParticipantProfile,
    ) -> Result<ClientConnection, SyncError>;
}

/// Client side of an attached connection
pub struct ClientConnection {
    pub participant_id: ParticipantId,
    pub intents: Arc<dyn IntentSender>,
    /// Latest snapshot received, kept in sequence order
    pub store: Arc<SessionStore>,
}
