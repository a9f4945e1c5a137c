//! Snapshot synchronizer
//!
//! Each live session is owned by one [`SessionHub`]. The hub serializes
//! every mutation of its session, and after each successful one publishes
//! a complete [`Snapshot`](poker_domain::Snapshot) with the next sequence id
//! to every attached connection. Rejected intents change nothing and are
//! answered only to the connection that sent them.
//!
//! [`SessionRegistry`] maps session ids to hubs and creates a session the
//! first time anyone attaches to it. Hubs of different sessions never
//! contend with each other.

pub mod error;
pub mod hub;
pub mod local;
pub mod message;
pub mod registry;

pub use error::SyncError;
pub use hub::{ConnectionId, SessionHub};
pub use local::LocalConnector;
pub use message::{Rejection, ServerMessage};
pub use registry::SessionRegistry;
