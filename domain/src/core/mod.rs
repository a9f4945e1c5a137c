//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`] - identifiers for sessions, participants and work items
//! - [`error::SessionError`] - the rejection taxonomy for intents

pub mod error;
pub mod ids;
