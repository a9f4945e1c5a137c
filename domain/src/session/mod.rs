//! Session domain
//!
//! The [`Session`] aggregate is the single owner of participants, work
//! items, votes and the round phase. Every mutation goes through one of its
//! operations, which check the caller's role and the current phase before
//! touching any state.
//!
//! # Phase lifecycle
//!
//! ```text
//!  lobby ──(set active item)──▶ voting ──(reveal)──▶ revealing ──(show results)──▶ results
//!                                 ▲                      │                            │
//!                                 └──────(clear votes / set active item)──────────────┘
//! ```
//!
//! `lobby` is left as soon as a work item becomes active and is never
//! re-entered.

pub mod aggregate;
pub mod participant;
pub mod phase;
pub mod settings;
pub mod work_item;

pub use aggregate::{Applied, JoinOutcome, Session};
pub use participant::{
    ConnectionStatus, JobCategory, Participant, ParticipantProfile, ParticipantRole,
};
pub use phase::SessionPhase;
pub use settings::{DeckPreset, SessionSettings, SettingsUpdate};
pub use work_item::{WorkItem, WorkItemDraft};
