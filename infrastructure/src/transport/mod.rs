//! WebSocket transport
//!
//! Clients connect to `/ws/{session_id}` with their identity in the query
//! string. Inbound text frames carry intents; outbound frames carry
//! snapshots and rejections as produced by the synchronizer.

pub mod codec;
pub mod error;
pub mod ws;

pub use codec::{decode_intent, encode_message};
pub use error::TransportError;
pub use ws::{Handshake, build_router, serve, serve_listener};
