//! Outgoing message port
//!
//! A [`MessageSink`] is the server's handle on one client connection. The
//! synchronizer pushes snapshots and rejections into it; the transport
//! drains it onto the wire.

use crate::sync::ServerMessage;
use thiserror::Error;
use tokio::sync::mpsc;

/// The receiving side of a sink has gone away
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Connection closed")]
pub struct SinkClosed;

/// Per-connection outbound channel.
///
/// `deliver` must not block: it is called while the session is locked.
pub trait MessageSink: Send + Sync {
    fn deliver(&self, message: ServerMessage) -> Result<(), SinkClosed>;
}

impl MessageSink for mpsc::UnboundedSender<ServerMessage> {
    fn deliver(&self, message: ServerMessage) -> Result<(), SinkClosed> {
        self.send(message).map_err(|_| SinkClosed)
    }
}
