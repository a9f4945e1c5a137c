//! Presentation layer for planning-poker
//!
//! This crate contains CLI definitions, output formatters and
//! progress reporters for the simulate command.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, LogFormat, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
