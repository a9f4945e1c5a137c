//! Run Simulation use case
//!
//! Plays a complete estimation session: a moderator and a number of
//! simulated voters join, each work item gets a round, and the moderator
//! reveals, shows results and records the suggested estimate.

use super::simulated_peer::SimulatedPeer;
use crate::ports::connector::{ClientConnection, SessionConnector};
use crate::sync::SyncError;
use poker_domain::{
    Intent, JobCategory, ParticipantId, ParticipantProfile, RoundSummary, SessionId, SessionPhase,
    Snapshot, VoteValue, WorkItem, WorkItemDraft, WorkItemId,
};
use serde::Serialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur during a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("No work items to estimate")]
    NoWorkItems,

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Callback for progress updates during a simulation
pub trait SimulationProgress: Send + Sync {
    /// Called once everyone has joined
    fn on_participants_ready(&self, _participants: usize) {}

    /// Called when a round opens; `index` is zero-based
    fn on_round_start(&self, _item: &WorkItem, _index: usize, _total: usize) {}

    /// Called after the moderator has recorded the estimate
    fn on_round_complete(&self, _round: &RoundReport) {}
}

/// No-op progress for when progress reporting is not needed
pub struct NoSimulationProgress;

impl SimulationProgress for NoSimulationProgress {}

/// Input for the [`RunSimulationUseCase`]
#[derive(Debug, Clone)]
pub struct RunSimulationInput {
    pub session_id: SessionId,
    /// Titles of the work items to estimate, in order
    pub work_items: Vec<String>,
    /// Number of simulated voters besides the moderator
    pub voters: usize,
    /// Seed for the voters' random choices
    pub seed: u64,
    /// How long a voter "thinks" before playing a card
    pub think_time_ms: RangeInclusive<u64>,
    /// Upper bound on each wait for the session to reach a state
    pub step_timeout: Duration,
}

impl RunSimulationInput {
    pub fn new(session_id: impl Into<SessionId>, work_items: Vec<String>) -> Self {
        Self {
            session_id: session_id.into(),
            work_items,
            voters: 4,
            seed: 0,
            think_time_ms: 50..=400,
            step_timeout: Duration::from_secs(10),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_voters(mut self, voters: usize) -> Self {
        self.voters = voters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_think_time_ms(mut self, think_time_ms: RangeInclusive<u64>) -> Self {
        self.think_time_ms = think_time_ms;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }
}

/// One cast vote, attributed by display name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub participant: String,
    pub value: VoteValue,
}

/// Outcome of one estimation round
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub work_item: WorkItem,
    pub votes: Vec<VoteRecord>,
    pub summary: RoundSummary,
    pub agreed_estimate: VoteValue,
}

/// Outcome of the whole simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub session_id: SessionId,
    pub session_name: String,
    pub participants: usize,
    pub rounds: Vec<RoundReport>,
    /// Sequence id of the last snapshot the moderator saw
    pub final_sequence_id: u64,
}

/// Use case for running a simulated session
pub struct RunSimulationUseCase<C: SessionConnector + 'static> {
    connector: Arc<C>,
    consensus_threshold: f64,
}

impl<C: SessionConnector + 'static> RunSimulationUseCase<C> {
    pub fn new(connector: Arc<C>, consensus_threshold: f64) -> Self {
        Self {
            connector,
            consensus_threshold,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunSimulationInput,
    ) -> Result<SimulationReport, SimulationError> {
        self.execute_with_progress(input, &NoSimulationProgress)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunSimulationInput,
        progress: &dyn SimulationProgress,
    ) -> Result<SimulationReport, SimulationError> {
        if input.work_items.is_empty() {
            return Err(SimulationError::NoWorkItems);
        }
        info!(
            session = %input.session_id,
            voters = input.voters,
            items = input.work_items.len(),
            "Starting simulation"
        );

        let moderator = self
            .connector
            .connect(
                &input.session_id,
                ParticipantProfile::new("moderator", "Moderator")
                    .with_job_category(JobCategory::Product),
            )
            .await?;

        // Dropping the set aborts any peer still running on an early return
        let cancel = CancellationToken::new();
        let mut peers = JoinSet::new();
        let mut voter_ids = Vec::with_capacity(input.voters);
        for n in 1..=input.voters {
            let category = if n % 3 == 0 {
                JobCategory::Qa
            } else {
                JobCategory::Developer
            };
            let profile = ParticipantProfile::new(format!("bot-{}", n), format!("Bot {}", n))
                .with_job_category(category);
            let connection = self.connector.connect(&input.session_id, profile).await?;
            voter_ids.push(connection.participant_id.clone());

            let peer = SimulatedPeer::new(
                connection,
                input.seed.wrapping_add(n as u64),
                input.think_time_ms.clone(),
            );
            peers.spawn(peer.run(cancel.child_token()));
        }

        let participants = input.voters + 1;
        wait_until(&moderator, "participants to join", input.step_timeout, |s| {
            s.session
                .participants()
                .iter()
                .filter(|p| p.is_connected())
                .count()
                >= participants
        })
        .await?;
        progress.on_participants_ready(participants);

        let items = self.add_work_items(&moderator, &input).await?;

        let mut rounds = Vec::with_capacity(items.len());
        for (index, item_id) in items.iter().enumerate() {
            let round = self
                .run_round(&moderator, item_id, &voter_ids, &input, index, items.len(), progress)
                .await?;
            rounds.push(round);
        }

        cancel.cancel();
        while peers.join_next().await.is_some() {}

        let last = moderator.store.current();
        moderator.intents.close().await;

        let (session_name, final_sequence_id) = last
            .map(|s| (s.session.name().to_string(), s.sequence_id))
            .unwrap_or_default();
        info!(session = %input.session_id, rounds = rounds.len(), "Simulation finished");

        Ok(SimulationReport {
            session_id: input.session_id,
            session_name,
            participants,
            rounds,
            final_sequence_id,
        })
    }

    /// Add the input's work items and return their ids in order.
    async fn add_work_items(
        &self,
        moderator: &ClientConnection,
        input: &RunSimulationInput,
    ) -> Result<Vec<WorkItemId>, SimulationError> {
        let existing = moderator
            .store
            .current()
            .map(|s| s.session.work_items().len())
            .unwrap_or(0);

        for title in &input.work_items {
            moderator
                .intents
                .send(Intent::AddWorkItem(WorkItemDraft::new(title.as_str())))
                .await?;
        }

        let expected = existing + input.work_items.len();
        let snapshot = wait_until(moderator, "work items", input.step_timeout, |s| {
            s.session.work_items().len() >= expected
        })
        .await?;

        Ok(snapshot.session.work_items()[existing..]
            .iter()
            .map(|w| w.id.clone())
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_round(
        &self,
        moderator: &ClientConnection,
        item_id: &WorkItemId,
        voter_ids: &[ParticipantId],
        input: &RunSimulationInput,
        index: usize,
        total: usize,
        progress: &dyn SimulationProgress,
    ) -> Result<RoundReport, SimulationError> {
        moderator
            .intents
            .send(Intent::SetActiveWorkItem {
                work_item_id: item_id.clone(),
            })
            .await?;

        let opened = wait_until(moderator, "round to open", input.step_timeout, |s| {
            s.session.active_work_item_id() == Some(item_id)
        })
        .await?;
        if let Some(item) = opened.session.work_item(item_id) {
            progress.on_round_start(item, index, total);
        }

        // With auto reveal on, the last vote may already have revealed
        let voted = wait_until(moderator, "votes", input.step_timeout, |s| {
            s.session.active_work_item_id() == Some(item_id)
                && voter_ids.iter().all(|id| {
                    s.session
                        .participant(id)
                        .is_none_or(|p| p.has_voted || !p.is_connected())
                })
        })
        .await?;
        if voted.session.phase() == SessionPhase::Voting {
            moderator.intents.send(Intent::RevealVotes).await?;
        }
        moderator.intents.send(Intent::ShowResults).await?;

        let results = wait_until(moderator, "results", input.step_timeout, |s| {
            s.session.phase() == SessionPhase::Results
        })
        .await?;
        let summary = RoundSummary::from_session(&results.session, self.consensus_threshold)
            .unwrap_or_else(|| RoundSummary::from_votes(&[], self.consensus_threshold));
        let agreed_estimate = summary.suggested_estimate();

        moderator
            .intents
            .send(Intent::SetAgreedEstimate {
                work_item_id: item_id.clone(),
                estimate: agreed_estimate,
            })
            .await?;
        let recorded = wait_until(moderator, "estimate", input.step_timeout, |s| {
            s.session
                .work_item(item_id)
                .is_some_and(|w| w.agreed_estimate == agreed_estimate)
        })
        .await?;

        let votes = results
            .session
            .votes()
            .values()
            .map(|vote| VoteRecord {
                participant: results
                    .session
                    .participant(&vote.participant_id)
                    .map(|p| p.display_name.clone())
                    .unwrap_or_else(|| vote.participant_id.to_string()),
                value: vote.value,
            })
            .collect();
        let work_item = recorded
            .session
            .work_item(item_id)
            .cloned()
            .ok_or_else(|| SimulationError::Timeout(format!("work item {}", item_id)))?;

        let round = RoundReport {
            work_item,
            votes,
            summary,
            agreed_estimate,
        };
        debug!(item = %item_id, estimate = %agreed_estimate, "Round complete");
        progress.on_round_complete(&round);
        Ok(round)
    }
}

async fn wait_until<F>(
    connection: &ClientConnection,
    what: &str,
    timeout: Duration,
    predicate: F,
) -> Result<Arc<Snapshot>, SimulationError>
where
    F: FnMut(&Snapshot) -> bool,
{
    match tokio::time::timeout(timeout, connection.store.wait_for(predicate)).await {
        Ok(Some(snapshot)) => Ok(snapshot),
        _ => Err(SimulationError::Timeout(what.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SessionDefaults, SyncOptions};
    use crate::ports::clock::ManualClock;
    use crate::sync::{LocalConnector, SessionRegistry};
    use poker_domain::{CONSENSUS_THRESHOLD_PERCENT, SessionSettings};
    use std::sync::Mutex;

    fn connector(settings: SessionSettings) -> Arc<LocalConnector> {
        Arc::new(LocalConnector::new(Arc::new(SessionRegistry::new(
            SessionDefaults::default().with_settings(settings),
            SyncOptions::default(),
            Arc::new(ManualClock::new(0)),
        ))))
    }

    fn input(voters: usize) -> RunSimulationInput {
        RunSimulationInput::new("sim", vec!["Login".to_string(), "Signup".to_string()])
            .with_voters(voters)
            .with_seed(42)
            .with_think_time_ms(0..=5)
            .with_step_timeout(Duration::from_secs(5))
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SimulationProgress for Recorder {
        fn on_participants_ready(&self, participants: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("ready {}", participants));
        }

        fn on_round_start(&self, item: &WorkItem, index: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}/{}", item.title, index + 1, total));
        }

        fn on_round_complete(&self, round: &RoundReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", round.work_item.title));
        }
    }

    #[tokio::test]
    async fn test_simulation_estimates_every_item() {
        let use_case =
            RunSimulationUseCase::new(connector(SessionSettings::default()), CONSENSUS_THRESHOLD_PERCENT);
        let recorder = Recorder::default();
        let report = use_case
            .execute_with_progress(input(3), &recorder)
            .await
            .unwrap();

        assert_eq!(report.session_name, "Session sim");
        assert_eq!(report.participants, 4);
        assert_eq!(report.rounds.len(), 2);
        for round in &report.rounds {
            assert_eq!(round.votes.len(), 3);
            assert_eq!(round.summary.total_votes, 3);
            assert_eq!(round.agreed_estimate, round.summary.suggested_estimate());
            assert_eq!(round.work_item.agreed_estimate, round.agreed_estimate);
        }
        assert!(report.final_sequence_id > 0);

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "ready 4",
                "start Login 1/2",
                "done Login",
                "start Signup 2/2",
                "done Signup",
            ]
        );
    }

    #[tokio::test]
    async fn test_simulation_with_auto_reveal_enabled() {
        let use_case = RunSimulationUseCase::new(
            connector(SessionSettings::default().with_auto_reveal(true)),
            CONSENSUS_THRESHOLD_PERCENT,
        );
        let report = use_case.execute(input(2)).await.unwrap();
        assert_eq!(report.rounds.len(), 2);
    }

    #[tokio::test]
    async fn test_no_work_items() {
        let use_case =
            RunSimulationUseCase::new(connector(SessionSettings::default()), CONSENSUS_THRESHOLD_PERCENT);
        let err = use_case
            .execute(RunSimulationInput::new("sim", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::NoWorkItems));
    }
}
