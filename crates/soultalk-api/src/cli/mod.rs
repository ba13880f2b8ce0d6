//! CLI command definitions and dispatch for the `soultalk` binary.
//!
//! Uses clap derive macros for argument parsing. Session management follows a
//! noun-verb pattern (e.g., `soultalk session list --email ...`).

pub mod check;
pub mod send;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Emotion-aware chat backend.
#[derive(Parser)]
#[command(name = "soultalk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Also export spans to stdout through OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Manage chat sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Send a text message to a session and print the reply.
    Send {
        /// Session ID.
        session_id: String,

        /// Owner email.
        #[arg(long, env = "SOULTALK_EMAIL")]
        email: String,

        /// Message text.
        text: String,
    },

    /// Check that the database and the LLM provider are reachable.
    Check,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create an empty session.
    New {
        /// Owner email.
        #[arg(long, env = "SOULTALK_EMAIL")]
        email: String,
    },

    /// List sessions, newest first.
    #[command(alias = "ls")]
    List {
        /// Owner email.
        #[arg(long, env = "SOULTALK_EMAIL")]
        email: String,
    },

    /// Show the message history of a session.
    Messages {
        /// Session ID.
        session_id: String,
    },

    /// Rename a session.
    Rename {
        /// Session ID.
        session_id: String,

        /// Owner email.
        #[arg(long, env = "SOULTALK_EMAIL")]
        email: String,

        /// New title.
        #[arg(long)]
        title: String,
    },

    /// Delete a session and all its messages.
    #[command(alias = "rm")]
    Delete {
        /// Session ID.
        session_id: String,

        /// Owner email.
        #[arg(long, env = "SOULTALK_EMAIL")]
        email: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}
