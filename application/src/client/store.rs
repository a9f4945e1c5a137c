//! Client snapshot store

use crate::sync::{Rejection, ServerMessage};
use poker_domain::{RoundSummary, Snapshot, SnapshotReconciler};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Holds the newest snapshot a client has seen.
///
/// Snapshots that are not newer than the current one are discarded, so a
/// late or duplicated delivery can never roll the view back. Subscribers are
/// woken only when the snapshot actually changes.
pub struct SessionStore {
    state: watch::Sender<Option<Arc<Snapshot>>>,
    consensus_threshold: f64,
}

impl SessionStore {
    pub fn new(consensus_threshold: f64) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state,
            consensus_threshold,
        }
    }

    /// Replace the current snapshot if `snapshot` is newer.
    ///
    /// Returns whether it was applied.
    pub fn apply(&self, snapshot: Arc<Snapshot>) -> bool {
        let sequence_id = snapshot.sequence_id;
        let applied = self.state.send_if_modified(|current| {
            let mut reconciler =
                SnapshotReconciler::with_last_applied(current.as_ref().map(|s| s.sequence_id));
            if reconciler.accept(&snapshot) {
                *current = Some(snapshot);
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(sequence_id, "Discarding stale snapshot");
        }
        applied
    }

    /// Feed a server message in; rejections are handed back to the caller.
    pub fn receive(&self, message: ServerMessage) -> Option<Rejection> {
        match message {
            ServerMessage::Snapshot(snapshot) => {
                self.apply(snapshot);
                None
            }
            ServerMessage::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().clone()
    }

    pub fn last_sequence_id(&self) -> Option<u64> {
        self.state.borrow().as_ref().map(|s| s.sequence_id)
    }

    /// Round summary of the current snapshot; `None` while votes are hidden.
    pub fn summary(&self) -> Option<RoundSummary> {
        self.current()
            .and_then(|s| RoundSummary::from_session(&s.session, self.consensus_threshold))
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.state.subscribe()
    }

    /// Wait until the current snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Option<Arc<Snapshot>>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let mut updates = self.state.subscribe();
        updates
            .wait_for(|current| current.as_deref().is_some_and(&mut predicate))
            .await
            .ok()
            .and_then(|current| (*current).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_domain::{
        ParticipantId, ParticipantProfile, Session, SessionId, SessionSettings, VoteValue,
        WorkItemDraft, WorkItemId,
    };

    fn session() -> Session {
        let mut session = Session::new(
            SessionId::new("room"),
            "Session room",
            ParticipantId::new("m"),
            SessionSettings::default(),
        );
        session.join(ParticipantProfile::new("m", "Mia")).unwrap();
        session
    }

    fn snapshot(session: &Session, sequence_id: u64) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(session.clone(), 0, sequence_id))
    }

    #[test]
    fn test_stale_snapshots_are_discarded() {
        let store = SessionStore::new(70.0);
        let session = session();

        assert!(store.apply(snapshot(&session, 5)));
        assert!(!store.apply(snapshot(&session, 4)));
        assert!(!store.apply(snapshot(&session, 5)));
        assert_eq!(store.last_sequence_id(), Some(5));
        assert!(store.apply(snapshot(&session, 6)));
        assert_eq!(store.last_sequence_id(), Some(6));
    }

    #[test]
    fn test_summary_only_when_votes_visible() {
        let store = SessionStore::new(70.0);
        let mut session = session();
        let m = ParticipantId::new("m");
        session
            .add_work_item(&m, WorkItemDraft::new("Login"))
            .unwrap();
        session
            .set_active_work_item(&m, &WorkItemId::new("wi-1"))
            .unwrap();
        session.cast_vote(&m, VoteValue::from(3.0), 0).unwrap();

        store.apply(snapshot(&session, 1));
        assert!(store.summary().is_none());

        session.reveal_votes(&m).unwrap();
        store.apply(snapshot(&session, 2));
        let summary = store.summary().unwrap();
        assert_eq!(summary.average, Some(3.0));
        assert!(summary.consensus);
    }

    #[tokio::test]
    async fn test_wait_for_wakes_on_matching_snapshot() {
        let store = Arc::new(SessionStore::new(70.0));
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_for(|s| s.sequence_id >= 3).await })
        };

        let session = session();
        for sequence_id in 1..=3 {
            store.apply(snapshot(&session, sequence_id));
            tokio::task::yield_now().await;
        }

        let found = waiter.await.unwrap().unwrap();
        assert_eq!(found.sequence_id, 3);
    }

    #[test]
    fn test_rejections_are_returned() {
        let store = SessionStore::new(70.0);
        let error = poker_domain::SessionError::not_found("work item wi-9");
        let rejection = store
            .receive(ServerMessage::rejected(&error, Some("set_active_work_item")))
            .unwrap();
        assert_eq!(rejection.kind, poker_domain::ErrorKind::NotFoundError);
        assert!(store.current().is_none());
    }
}
