//! Application layer for planning-poker
//!
//! This crate contains the snapshot synchronizer, the client-side store,
//! port definitions and use cases. It depends only on the domain layer.

pub mod client;
pub mod config;
pub mod ports;
pub mod sync;
pub mod use_cases;

// Re-export commonly used types
pub use client::SessionStore;
pub use config::{SessionDefaults, SyncOptions};
pub use ports::{
    clock::{Clock, ManualClock},
    connector::{ClientConnection, IntentSender, SessionConnector},
    message_sink::{MessageSink, SinkClosed},
};
pub use sync::{
    ConnectionId, LocalConnector, Rejection, ServerMessage, SessionHub, SessionRegistry, SyncError,
};
pub use use_cases::run_simulation::{
    NoSimulationProgress, RoundReport, RunSimulationInput, RunSimulationUseCase,
    SimulationError, SimulationProgress, SimulationReport, VoteRecord,
};
pub use use_cases::simulated_peer::SimulatedPeer;
