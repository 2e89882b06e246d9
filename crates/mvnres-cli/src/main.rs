//! `mvnres` CLI binary.
//!
//! Parses arguments with `clap`, initializes `tracing`, resolves the
//! given POM's effective dependency graph, and prints the requested
//! sections.

mod cli;
mod commands;
mod tracer;

use miette::Result;

fn main() -> Result<()> {
    let args = cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(if args.verbose { "debug" } else { "warn" })
        }))
        .init();

    commands::run(args)
}
