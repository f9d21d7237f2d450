//! opcat - operator catalog tool
//!
//! Validates declarative operator catalogs and computes incremental diffs
//! between two catalogs.

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Log to stderr; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let filter = if verbose { "opcat=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::run(&args),
        Commands::Diff(args) => commands::diff::run(&args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
