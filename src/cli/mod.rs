//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - validate: Validate command arguments
//! - diff: Diff command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod diff;
pub mod validate;

pub use completions::CompletionsArgs;
pub use diff::{DiffArgs, OutputFormat};
pub use validate::ValidateArgs;

/// opcat - operator catalog tool
///
/// Validate operator catalogs and compute incremental diffs between them.
#[derive(Parser, Debug)]
#[command(
    name = "opcat",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Validate operator catalogs and compute catalog diffs",
    long_about = "opcat builds a validated model from declarative catalog records \
                  (packages, channels, bundles, deprecations), checks the upgrade graph \
                  of every channel and computes dependency-closed diffs between catalogs.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  opcat validate catalog.yaml                      \x1b[90m# Check a catalog\x1b[0m\n   \
                  opcat diff --new catalog.json --heads-only       \x1b[90m# Channel heads only\x1b[0m\n   \
                  opcat diff --old prev.yaml --new next.yaml -o yaml \x1b[90m# What changed\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate catalog files
    Validate(ValidateArgs),

    /// Compute the diff between two catalogs
    Diff(DiffArgs),

    /// Show the version and the catalog formats it understands
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
