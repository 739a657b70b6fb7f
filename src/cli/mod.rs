//! CLI module for StudyConcierge.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// StudyConcierge - study sessions with a timestamped memory bank
///
/// Tracks study sessions, records their progress, and keeps an append-only
/// memory of notes, quizzes and lifecycle events that can be searched by keyword.
#[derive(Parser, Debug)]
#[command(name = "studyconcierge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through a scripted study session
    Demo {
        /// User to run the session for
        #[arg(short, long, default_value = "student_123")]
        user: String,

        /// Ask the extractive summarizer for a summary when the session ends
        #[arg(long)]
        summarize: bool,
    },

    /// Start an interactive shell over an in-memory concierge
    Shell,

    /// Start HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}
