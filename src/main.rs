//! Stereotyper CLI entry point.
//!
//! Parses arguments, initialises logging and delegates to the handler in
//! `cli`. The default log filter is `warn` so skipped-unit diagnostics
//! reach the user without any environment setup.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use stereotyper::cli::{handle_annotate, Cli};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    handle_annotate(&cli)
}
