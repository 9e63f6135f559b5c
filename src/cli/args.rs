//! CLI argument definitions using clap
//!
//! Commands:
//! - dudaflix serve [--config <path>] [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DudaFlix - movie recommendation catalog server
#[derive(Parser, Debug)]
#[command(name = "dudaflix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the catalog and serve the HTTP API
    Serve {
        /// Path to a JSON configuration file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
