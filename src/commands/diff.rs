//! Diff command implementation

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::cli::{DiffArgs, OutputFormat};
use opcat::config::IncludeConfig;
use opcat::diff::DiffIncluder;
use opcat::error::Result;
use opcat::{DeclarativeConfig, DiffGenerator, Model, from_model, to_model};

/// Run diff command
pub fn run(args: &DiffArgs) -> Result<()> {
    let out = render(args)?;
    std::io::stdout().lock().write_all(out.as_bytes())?;
    Ok(())
}

fn load_model(files: &[PathBuf]) -> Result<Model> {
    if files.is_empty() {
        return Ok(Model::new());
    }
    to_model(DeclarativeConfig::from_files(files)?)
}

fn render(args: &DiffArgs) -> Result<String> {
    let old = load_model(&args.old)?;
    let new = load_model(&args.new)?;
    debug!(
        old_packages = old.len(),
        new_packages = new.len(),
        "loaded catalogs"
    );

    let includer = match &args.include_file {
        Some(path) => IncludeConfig::from_file(path)?.to_includer()?,
        None => DiffIncluder::default(),
    };
    let generator = DiffGenerator {
        skip_dependencies: args.skip_deps,
        heads_only: args.heads_only,
        include_additively: args.include_additive,
        includer,
    };

    let diff = generator.run(&old, &new)?;
    info!(
        packages = diff.len(),
        bundles = diff.bundles().count(),
        "diff computed"
    );

    let records = from_model(&diff);
    match args.output {
        OutputFormat::Json => records.to_json_stream(),
        OutputFormat::Yaml => records.to_yaml_documents(),
    }
}
