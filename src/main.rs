//! DudaFlix entry point
//!
//! Parses arguments, dispatches to the CLI, prints errors to stderr and exits
//! non-zero on failure. Everything else lives in `cli`.

use dudaflix::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
