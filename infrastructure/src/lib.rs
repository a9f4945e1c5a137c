//! Infrastructure layer for planning-poker
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the system clock and the
//! WebSocket transport.

pub mod clock;
pub mod config;
pub mod transport;

// Re-export commonly used types
pub use clock::SystemClock;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileServerConfig, FileSessionConfig,
    FileSyncConfig,
};
pub use transport::{Handshake, TransportError, build_router, serve, serve_listener};
