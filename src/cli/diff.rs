use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Encoding of the emitted records
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Stream of pretty-printed JSON objects
    #[default]
    Json,
    /// YAML documents separated by `---`
    Yaml,
}

/// Arguments for diff command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Only what changed since the last release:\n    opcat diff --old prev.yaml --new next.yaml\n\n\
                  Channel heads of a new catalog:\n    opcat diff --new catalog.yaml --heads-only\n\n\
                  Selected content plus what changed:\n    opcat diff --old prev.yaml --new next.yaml -i include.yaml --include-additive")]
pub struct DiffArgs {
    /// Prior catalog files (omit when building a catalog from scratch)
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub old: Vec<PathBuf>,

    /// New catalog files
    #[arg(long, value_name = "FILE", num_args = 1.., required = true)]
    pub new: Vec<PathBuf>,

    /// Copy only the head of every channel
    #[arg(long)]
    pub heads_only: bool,

    /// Do not add bundles that satisfy dependencies
    #[arg(long)]
    pub skip_deps: bool,

    /// YAML file selecting packages, channels, versions or bundles to include
    #[arg(long, short = 'i', value_name = "YAML")]
    pub include_file: Option<PathBuf>,

    /// Merge included content into the diff instead of replacing it
    #[arg(long, requires = "include_file")]
    pub include_additive: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}
