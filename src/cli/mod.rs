//! CLI module - Command-line interface for Scribe
//!
//! Running without a subcommand starts the HTTP server.

mod commands;

use clap::{Parser, Subcommand};

/// Scribe - Blog backend with token authentication
#[derive(Parser)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "web")]
    Serve,

    /// Create an account directly in the database
    CreateUser {
        /// Unique username
        username: String,
        /// Unique email address
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Grant the ADMIN role
        #[arg(long)]
        admin: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
