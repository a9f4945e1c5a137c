//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for simulation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round with its votes and statistics
    Full,
    /// One line per work item
    Summary,
    /// JSON report
    Json,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// CLI arguments for planning-poker
#[derive(Parser, Debug)]
#[command(name = "planning-poker")]
#[command(author, version, about = "Planning poker - real-time team estimation sessions")]
#[command(long_about = r#"
Planning poker runs estimation sessions over WebSocket. Everyone in a
session sees the same state: participants, work items, the current round
and, once revealed, every vote with its statistics.

Clients connect to /ws/{session_id}?participantId=..&displayName=..
The first person to connect to a session becomes its moderator.

Configuration files are loaded from (in priority order):
1. POKER_SECTION__KEY  Environment variables (e.g. POKER_SERVER__PORT)
2. --config <path>     Explicit config file
3. ./poker.toml        Project-level config
4. ~/.config/planning-poker/config.toml   Global config

Example:
  planning-poker serve --port 8000
  planning-poker simulate -n 5 --item "Login page" --item "Checkout"
  planning-poker config --show-sources
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Ignore global and project configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket server
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play a session with simulated voters and print the results
    Simulate {
        /// Number of simulated voters
        #[arg(short = 'n', long, default_value_t = 4)]
        voters: usize,

        /// Work item to estimate (can be specified multiple times)
        #[arg(short, long = "item", value_name = "TITLE")]
        items: Vec<String>,

        /// Session id to simulate
        #[arg(long, default_value = "sim")]
        session: String,

        /// Seed for the voters' choices
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Longest time a voter thinks before voting, in milliseconds
        #[arg(long, default_value_t = 400)]
        max_think_ms: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,

        /// Suppress progress indicators
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the effective configuration
    Config {
        /// Show configuration file locations instead
        #[arg(long)]
        show_sources: bool,
    },
}
