//! Session registry

use super::error::SyncError;
use super::hub::{ConnectionId, SessionHub};
use crate::config::{SessionDefaults, SyncOptions};
use crate::ports::clock::Clock;
use crate::ports::message_sink::MessageSink;
use poker_domain::{ParticipantProfile, SessionError, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// All live sessions of this process, keyed by id.
///
/// Sessions are created on first attach and dropped when their last
/// connection detaches. Hubs are attached to while the map lock is held, so
/// a session is never evicted out from under a connection that is joining.
pub struct SessionRegistry {
    hubs: RwLock<HashMap<SessionId, Arc<SessionHub>>>,
    defaults: SessionDefaults,
    options: SyncOptions,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(defaults: SessionDefaults, options: SyncOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            hubs: RwLock::new(HashMap::new()),
            defaults,
            options,
            clock,
        }
    }

    pub fn defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<Arc<SessionHub>> {
        self.hubs.read().await.get(session_id).cloned()
    }

    /// Attach a connection to `session_id`, creating the session on first use.
    ///
    /// The creator becomes the session's owner and moderator.
    pub async fn attach(
        &self,
        session_id: &SessionId,
        profile: ParticipantProfile,
        sink: Arc<dyn MessageSink>,
    ) -> Result<(Arc<SessionHub>, ConnectionId), SyncError> {
        // Checked up front so a refused join never leaves an empty session behind
        if profile.display_name.trim().is_empty() {
            return Err(SessionError::malformed("display name cannot be empty").into());
        }

        {
            let hubs = self.hubs.read().await;
            if let Some(hub) = hubs.get(session_id).cloned() {
                let connection = hub.attach(profile, sink).await?;
                return Ok((hub, connection));
            }
        }

        let mut hubs = self.hubs.write().await;
        let hub = hubs
            .entry(session_id.clone())
            .or_insert_with(|| {
                info!(session = %session_id, owner = %profile.id, "Creating session");
                let session = self
                    .defaults
                    .new_session(session_id.clone(), profile.id.clone());
                Arc::new(SessionHub::new(session, self.clock.clone(), self.options))
            })
            .clone();
        match hub.attach(profile, sink).await {
            Ok(connection) => Ok((hub, connection)),
            Err(e) => {
                if hub.is_idle().await {
                    hubs.remove(session_id);
                }
                Err(e)
            }
        }
    }

    /// Detach `connection` from `hub`, dropping the session once nothing is
    /// connected to it.
    ///
    /// Returns `false` if the connection was no longer attached, for example
    /// after its participant was kicked or left.
    pub async fn detach(&self, hub: &Arc<SessionHub>, connection: ConnectionId) -> bool {
        let detached = hub.detach(connection).await;
        self.evict_if_idle(hub).await;
        detached
    }

    async fn evict_if_idle(&self, hub: &Arc<SessionHub>) {
        let session_id = hub.session_id();
        let mut hubs = self.hubs.write().await;
        let current = hubs
            .get(session_id)
            .is_some_and(|registered| Arc::ptr_eq(registered, hub));
        if current && hub.is_idle().await {
            hubs.remove(session_id);
            info!(session = %session_id, "Session closed, no connections left");
        }
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.hubs.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.hubs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.hubs.read().await.is_empty()
    }
}
