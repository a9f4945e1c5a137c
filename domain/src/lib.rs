//! Domain layer for planning-poker
//!
//! This crate contains the session model, the estimation engine and the
//! snapshot value exchanged with clients. It has no dependencies on
//! transport, configuration or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A [`Session`] is the single aggregate root: participants, work items,
//! the current round's votes and its [`SessionPhase`]. It checks roles and
//! phases on every operation and either applies a change completely or
//! rejects it with a [`SessionError`].
//!
//! ## Estimation
//!
//! The [`estimation`] functions reduce raw [`VoteValue`]s to average,
//! median, consensus and outliers. Only numeric votes count.
//!
//! ## Snapshot
//!
//! A [`Snapshot`] is a complete, sequence-numbered copy of a session. Clients
//! apply snapshots through a [`SnapshotReconciler`], which drops anything
//! that is not newer than what they already have.

pub mod core;
pub mod estimation;
pub mod intent;
pub mod session;
pub mod snapshot;
pub mod vote;

// Re-export commonly used types
pub use core::{
    error::{ErrorKind, SessionError},
    ids::{ParticipantId, SessionId, WorkItemId},
};
pub use estimation::{CONSENSUS_THRESHOLD_PERCENT, Outliers, RoundSummary};
pub use intent::{Intent, IntentFrame, JoinRequest};
pub use session::{
    Applied, ConnectionStatus, DeckPreset, JobCategory, JoinOutcome, Participant,
    ParticipantProfile, ParticipantRole, Session, SessionPhase, SessionSettings, SettingsUpdate,
    WorkItem, WorkItemDraft,
};
pub use snapshot::{Snapshot, SnapshotReconciler};
pub use vote::{Sentinel, Vote, VoteValue};
