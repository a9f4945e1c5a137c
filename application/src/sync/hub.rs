//! Per-session hub
//!
//! The hub holds its session behind an async mutex. Every operation takes
//! the lock, changes the session, and delivers the resulting snapshot to all
//! connections before releasing it, so snapshots reach each connection in
//! sequence order.

use super::error::SyncError;
use super::message::ServerMessage;
use crate::config::SyncOptions;
use crate::ports::clock::Clock;
use crate::ports::message_sink::MessageSink;
use poker_domain::{
    Applied, Intent, ParticipantId, ParticipantProfile, Session, SessionError, SessionId,
    SessionPhase, Snapshot,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identifies one attached connection within a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

struct Attachment {
    participant_id: ParticipantId,
    sink: Arc<dyn MessageSink>,
}

struct HubState {
    session: Session,
    /// Sequence id of the last published snapshot; 0 before the first one
    sequence_id: u64,
    connections: HashMap<ConnectionId, Attachment>,
}

impl HubState {
    fn is_attached(&self, participant: &ParticipantId) -> bool {
        self.attachment_count(participant) > 0
    }

    fn attachment_count(&self, participant: &ParticipantId) -> usize {
        self.connections
            .values()
            .filter(|a| &a.participant_id == participant)
            .count()
    }

    /// What clients are allowed to see of the session right now.
    fn view(&self, options: &SyncOptions) -> Session {
        if options.conceal_votes_while_voting && self.session.phase() == SessionPhase::Voting {
            self.session.with_concealed_votes()
        } else {
            self.session.clone()
        }
    }

    /// Send a fresh snapshot to every connection.
    ///
    /// Connections whose sink has closed are dropped; if that leaves a
    /// participant with no connection they are marked disconnected and the
    /// change is published as well. Returns the last sequence id used.
    fn publish(&mut self, now: u64, options: &SyncOptions) -> u64 {
        loop {
            self.sequence_id += 1;
            let snapshot = Snapshot::new(self.view(options), now, self.sequence_id);
            let message = ServerMessage::Snapshot(Arc::new(snapshot));

            let closed: Vec<ConnectionId> = self
                .connections
                .iter()
                .filter(|(_, a)| a.sink.deliver(message.clone()).is_err())
                .map(|(id, _)| *id)
                .collect();

            let mut changed = false;
            for connection in closed {
                if let Some(attachment) = self.connections.remove(&connection) {
                    debug!(%connection, participant = %attachment.participant_id, "Dropped closed connection");
                    if !self.is_attached(&attachment.participant_id)
                        && self.session.mark_disconnected(&attachment.participant_id)
                    {
                        changed = true;
                    }
                }
            }
            if !changed {
                return self.sequence_id;
            }
        }
    }

    fn drop_participant(&mut self, participant: &ParticipantId) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|_, a| &a.participant_id != participant);
        before - self.connections.len()
    }
}

/// Owns one session and fans its snapshots out to attached connections.
pub struct SessionHub {
    session_id: SessionId,
    state: Mutex<HubState>,
    clock: Arc<dyn Clock>,
    options: SyncOptions,
    next_connection: AtomicU64,
}

impl SessionHub {
    pub fn new(session: Session, clock: Arc<dyn Clock>, options: SyncOptions) -> Self {
        Self {
            session_id: session.id().clone(),
            state: Mutex::new(HubState {
                session,
                sequence_id: 0,
                connections: HashMap::new(),
            }),
            clock,
            options,
            next_connection: AtomicU64::new(1),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Join `profile` to the session and start delivering to `sink`.
    ///
    /// The join is published to everyone, so the new connection's first
    /// message is a snapshot that already contains its participant. If the
    /// join is refused nothing is registered.
    pub async fn attach(
        &self,
        profile: ParticipantProfile,
        sink: Arc<dyn MessageSink>,
    ) -> Result<ConnectionId, SyncError> {
        let participant_id = profile.id.clone();
        let mut state = self.state.lock().await;
        let outcome = state.session.join(profile)?;

        let connection = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed));
        state.connections.insert(
            connection,
            Attachment {
                participant_id: participant_id.clone(),
                sink,
            },
        );
        let sequence_id = state.publish(self.clock.now_millis(), &self.options);
        info!(
            session = %self.session_id,
            participant = %participant_id,
            %connection,
            ?outcome,
            sequence_id,
            "Participant attached"
        );
        Ok(connection)
    }

    /// Apply an intent on behalf of the participant behind `connection`.
    ///
    /// On success every connection receives the new snapshot. On failure
    /// only `connection` receives a rejection and the session is untouched.
    /// Kicking a participant drops all of their connections after the
    /// snapshot without them has been published. Leaving detaches
    /// `connection`; the participant is only marked disconnected when it
    /// was their last one.
    pub async fn dispatch(
        &self,
        connection: ConnectionId,
        intent: Intent,
    ) -> Result<Applied, SyncError> {
        let mut state = self.state.lock().await;
        let actor = state
            .connections
            .get(&connection)
            .map(|a| a.participant_id.clone())
            .ok_or(SyncError::NotAttached(connection))?;
        let intent_name = intent.name();
        let now = self.clock.now_millis();
        let leaving = matches!(intent, Intent::Leave);

        if leaving && state.attachment_count(&actor) > 1 {
            state.connections.remove(&connection);
            debug!(
                session = %self.session_id,
                participant = %actor,
                %connection,
                "Connection left, participant still attached"
            );
            return Ok(Applied::Updated);
        }

        match state.session.apply(&actor, intent, now) {
            Ok(applied) => {
                let sequence_id = state.publish(now, &self.options);
                debug!(
                    session = %self.session_id,
                    participant = %actor,
                    intent = intent_name,
                    sequence_id,
                    "Intent applied"
                );
                match &applied {
                    Applied::AutoRevealed => {
                        info!(session = %self.session_id, "All votes in, revealed automatically");
                    }
                    Applied::ParticipantRemoved(target) => {
                        let dropped = state.drop_participant(target);
                        info!(
                            session = %self.session_id,
                            participant = %target,
                            connections = dropped,
                            "Participant removed"
                        );
                    }
                    Applied::Updated => {}
                }
                if leaving {
                    state.connections.remove(&connection);
                    info!(session = %self.session_id, participant = %actor, %connection, "Participant left");
                }
                Ok(applied)
            }
            Err(error) => {
                warn!(
                    session = %self.session_id,
                    participant = %actor,
                    intent = intent_name,
                    kind = %error.kind(),
                    "Intent rejected: {}",
                    error
                );
                if let Some(attachment) = state.connections.get(&connection) {
                    let _ = attachment
                        .sink
                        .deliver(ServerMessage::rejected(&error, Some(intent_name)));
                }
                Err(error.into())
            }
        }
    }

    /// Answer `connection` with a rejection that did not come from the
    /// session, such as a frame that could not be decoded.
    pub async fn reject(
        &self,
        connection: ConnectionId,
        error: &SessionError,
    ) -> Result<(), SyncError> {
        let state = self.state.lock().await;
        let attachment = state
            .connections
            .get(&connection)
            .ok_or(SyncError::NotAttached(connection))?;
        warn!(
            session = %self.session_id,
            participant = %attachment.participant_id,
            kind = %error.kind(),
            "Frame rejected: {}",
            error
        );
        attachment
            .sink
            .deliver(ServerMessage::rejected(error, None))
            .map_err(|_| SyncError::Closed)
    }

    /// Stop delivering to `connection`.
    ///
    /// The participant is marked disconnected, and everyone is told, only
    /// when this was their last connection. Returns `false` if the
    /// connection was not attached.
    pub async fn detach(&self, connection: ConnectionId) -> bool {
        let mut state = self.state.lock().await;
        let Some(attachment) = state.connections.remove(&connection) else {
            return false;
        };
        let participant = attachment.participant_id;

        if !state.is_attached(&participant) && state.session.mark_disconnected(&participant) {
            let sequence_id = state.publish(self.clock.now_millis(), &self.options);
            info!(
                session = %self.session_id,
                participant = %participant,
                %connection,
                sequence_id,
                "Participant disconnected"
            );
        } else {
            debug!(session = %self.session_id, %connection, "Connection detached");
        }
        true
    }

    /// The snapshot a newly attached client would see, without publishing.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot::new(
            state.view(&self.options),
            self.clock.now_millis(),
            state.sequence_id,
        )
    }

    /// Unconcealed copy of the session
    pub async fn session(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// `true` once no connection is attached
    pub async fn is_idle(&self) -> bool {
        self.state.lock().await.connections.is_empty()
    }
}
