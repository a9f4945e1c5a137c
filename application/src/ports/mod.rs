//! Port definitions for the application layer.
//!
//! Ports are the seams where infrastructure plugs in: the wall clock, the
//! outgoing message channel of a connection, and the client side of a
//! session connection.

pub mod clock;
pub mod connector;
pub mod message_sink;
