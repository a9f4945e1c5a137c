//! Client-side state
//!
//! [`SessionStore`] is what a client renders from: the newest snapshot it
//! has received, replaced wholesale on every update.

pub mod store;

pub use store::SessionStore;
