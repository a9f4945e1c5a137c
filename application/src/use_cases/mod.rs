//! Use cases
//!
//! - [`run_simulation`]: drive a whole session with simulated voters
//! - [`simulated_peer`]: a single simulated voter

pub mod run_simulation;
pub mod simulated_peer;
