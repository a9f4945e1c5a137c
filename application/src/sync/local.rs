//! In-process connector
//!
//! Connects clients to a [`SessionRegistry`] in the same process. Messages
//! still flow through a per-connection channel, exactly as they would over
//! a socket, so clients see the same ordering either way.

use super::error::SyncError;
use super::hub::{ConnectionId, SessionHub};
use super::registry::SessionRegistry;
use crate::client::SessionStore;
use crate::ports::connector::{ClientConnection, IntentSender, SessionConnector};
use async_trait::async_trait;
use poker_domain::{Intent, ParticipantProfile, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

pub struct LocalConnector {
    registry: Arc<SessionRegistry>,
}

impl LocalConnector {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SessionConnector for LocalConnector {
    async fn connect(
        &self,
        session_id: &SessionId,
        profile: ParticipantProfile,
    ) -> Result<ClientConnection, SyncError> {
        let participant_id = profile.id.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (hub, connection) = self
            .registry
            .attach(session_id, profile, Arc::new(tx))
            .await?;

        let store = Arc::new(SessionStore::new(
            self.registry.defaults().consensus_threshold,
        ));
        let pump_store = store.clone();
        let pump_participant = participant_id.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Some(rejection) = pump_store.receive(message) {
                    debug!(
                        participant = %pump_participant,
                        kind = %rejection.kind,
                        "Rejected: {}",
                        rejection.message
                    );
                }
            }
        });

        Ok(ClientConnection {
            participant_id,
            intents: Arc::new(LocalIntentSender {
                registry: self.registry.clone(),
                hub,
                connection,
            }),
            store,
        })
    }
}

struct LocalIntentSender {
    registry: Arc<SessionRegistry>,
    hub: Arc<SessionHub>,
    connection: ConnectionId,
}

#[async_trait]
impl IntentSender for LocalIntentSender {
    async fn send(&self, intent: Intent) -> Result<(), SyncError> {
        self.hub.dispatch(self.connection, intent).await.map(|_| ())
    }

    async fn close(&self) {
        self.registry.detach(&self.hub, self.connection).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SessionDefaults, SyncOptions};
    use crate::ports::clock::ManualClock;
    use poker_domain::{ConnectionStatus, SessionError, SessionPhase, WorkItemDraft};

    fn connector() -> LocalConnector {
        LocalConnector::new(Arc::new(SessionRegistry::new(
            SessionDefaults::default(),
            SyncOptions::default(),
            Arc::new(ManualClock::new(0)),
        )))
    }

    #[tokio::test]
    async fn test_connection_store_follows_session() {
        let connector = connector();
        let room = SessionId::new("room");
        let mia = connector
            .connect(&room, ParticipantProfile::new("m", "Mia"))
            .await
            .unwrap();
        let ada = connector
            .connect(&room, ParticipantProfile::new("a", "Ada"))
            .await
            .unwrap();

        mia.intents
            .send(Intent::AddWorkItem(WorkItemDraft::new("Login")))
            .await
            .unwrap();
        let snapshot = ada
            .store
            .wait_for(|s| s.session.work_items().len() == 1)
            .await
            .unwrap();
        assert_eq!(snapshot.session.phase(), SessionPhase::Lobby);

        let err = ada.intents.send(Intent::ClearVotes).await.unwrap_err();
        assert!(matches!(err, SyncError::Session(SessionError::Authorization(_))));

        ada.intents.close().await;
        let snapshot = mia
            .store
            .wait_for(|s| {
                s.session
                    .participant(&ada.participant_id)
                    .is_some_and(|p| p.connection_status == ConnectionStatus::Disconnected)
            })
            .await;
        assert!(snapshot.is_some());

        mia.intents.close().await;
        assert!(connector.registry.is_empty().await);
    }
}
