use clap::Parser;
use std::path::PathBuf;

/// Arguments for validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Validate a YAML catalog:\n    opcat validate catalog.yaml\n\n\
                  Validate a catalog split across files:\n    opcat validate packages.json bundles.json")]
pub struct ValidateArgs {
    /// Catalog files (`.yaml`/`.yml` are YAML documents, anything else a JSON stream)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}
