//! Vote domain
//!
//! - [`VoteValue`] - what a participant put on the table: a number, a
//!   sentinel card, or nothing
//! - [`Vote`] - a value cast by a participant in the current round

pub mod entities;
pub mod value;

pub use entities::Vote;
pub use value::{Sentinel, VoteValue};
