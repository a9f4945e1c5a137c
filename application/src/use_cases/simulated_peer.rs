//! Simulated voter
//!
//! A [`SimulatedPeer`] watches its connection's snapshots and, whenever a
//! round is open and it has not voted yet, waits a random "thinking" time
//! and plays a random card from the session's deck.

use crate::ports::connector::ClientConnection;
use poker_domain::{Intent, Session, SessionPhase, VoteValue};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::ops::RangeInclusive;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct SimulatedPeer {
    connection: ClientConnection,
    rng: StdRng,
    think_time_ms: RangeInclusive<u64>,
}

impl SimulatedPeer {
    pub fn new(connection: ClientConnection, seed: u64, think_time_ms: RangeInclusive<u64>) -> Self {
        Self {
            connection,
            rng: StdRng::seed_from_u64(seed),
            think_time_ms,
        }
    }

    /// Vote in every round until cancelled or the connection goes away,
    /// then detach.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut updates = self.connection.store.subscribe();
        loop {
            let current = updates.borrow_and_update().clone();
            if let Some(snapshot) = current
                && self.should_vote(&snapshot.session)
            {
                let delay = self.think_time();
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
                if let Some(value) = self.pick_card(&snapshot.session) {
                    match self.connection.intents.send(Intent::CastVote { value }).await {
                        Ok(()) => {
                            debug!(participant = %self.connection.participant_id, %value, "Simulated vote cast")
                        }
                        Err(e) => {
                            debug!(participant = %self.connection.participant_id, "Simulated vote refused: {}", e)
                        }
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        self.connection.intents.close().await;
    }

    fn should_vote(&self, session: &Session) -> bool {
        session.phase() == SessionPhase::Voting
            && session
                .participant(&self.connection.participant_id)
                .is_some_and(|p| p.role.can_vote() && !p.has_voted)
    }

    fn think_time(&mut self) -> Duration {
        let (min, max) = (*self.think_time_ms.start(), *self.think_time_ms.end());
        let millis = if min >= max {
            min
        } else {
            self.rng.gen_range(min..=max)
        };
        Duration::from_millis(millis)
    }

    fn pick_card(&mut self, session: &Session) -> Option<VoteValue> {
        let cards: Vec<VoteValue> = session
            .settings()
            .card_deck
            .iter()
            .filter_map(|label| label.parse::<VoteValue>().ok())
            .filter(|value| !value.is_empty())
            .collect();
        cards.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SessionDefaults, SyncOptions};
    use crate::ports::clock::ManualClock;
    use crate::ports::connector::SessionConnector;
    use crate::sync::{LocalConnector, SessionRegistry};
    use poker_domain::{ParticipantId, ParticipantProfile, SessionId, WorkItemDraft, WorkItemId};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_peer_votes_once_per_round() {
        let connector = LocalConnector::new(Arc::new(SessionRegistry::new(
            SessionDefaults::default(),
            SyncOptions::default().with_conceal_votes(false),
            Arc::new(ManualClock::new(0)),
        )));
        let room = SessionId::new("room");
        let moderator = connector
            .connect(&room, ParticipantProfile::new("m", "Mia"))
            .await
            .unwrap();
        let bot = connector
            .connect(&room, ParticipantProfile::new("bot-1", "Bot 1"))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let peer = tokio::spawn(SimulatedPeer::new(bot, 7, 0..=5).run(cancel.clone()));

        moderator
            .intents
            .send(Intent::AddWorkItem(WorkItemDraft::new("Login")))
            .await
            .unwrap();
        moderator
            .intents
            .send(Intent::SetActiveWorkItem {
                work_item_id: WorkItemId::new("wi-1"),
            })
            .await
            .unwrap();

        let bot_id = ParticipantId::new("bot-1");
        let snapshot = moderator
            .store
            .wait_for(|s| {
                s.session
                    .participant(&bot_id)
                    .is_some_and(|p| p.has_voted)
            })
            .await
            .unwrap();
        let vote = snapshot.session.votes()[&bot_id].value;
        assert!(!vote.is_empty());
        assert!(
            snapshot
                .session
                .settings()
                .card_deck
                .contains(&vote.to_string())
        );

        cancel.cancel();
        peer.await.unwrap();
        let session = moderator
            .store
            .wait_for(|s| {
                s.session
                    .participant(&bot_id)
                    .is_some_and(|p| !p.is_connected())
            })
            .await;
        assert!(session.is_some());
    }
}
