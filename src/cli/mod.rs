//! CLI module for DudaFlix
//!
//! - serve: load configuration, open the store, serve HTTP

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{boot_catalog, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
