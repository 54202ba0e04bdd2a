//! smalldoc CLI - generic API documentation generator.
//!
//! Documents source files, runtime snapshots and Markdown documents into one
//! model and writes it as JSON, a standalone HTML page or a loader script.

mod error;
mod output;
mod run;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use output::Output;
use run::Cli;

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.execute(&output) {
        output.aborted(&err);
        std::process::exit(1);
    }
}
