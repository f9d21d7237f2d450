//! Validate command implementation
//!
//! Loads every given file into one record set and builds the model. All
//! problems found are reported together as a tree.

use tracing::debug;

use crate::cli::ValidateArgs;
use opcat::error::Result;
use opcat::{DeclarativeConfig, to_model};

/// Run validate command
pub fn run(args: &ValidateArgs) -> Result<()> {
    println!("{}", summary(args)?);
    Ok(())
}

fn summary(args: &ValidateArgs) -> Result<String> {
    let cfg = DeclarativeConfig::from_files(&args.files)?;
    debug!(
        files = args.files.len(),
        packages = cfg.packages.len(),
        channels = cfg.channels.len(),
        bundles = cfg.bundles.len(),
        "loaded catalog records"
    );

    let model = to_model(cfg)?;
    let channels: usize = model.packages.values().map(|p| p.channels.len()).sum();
    Ok(format!(
        "catalog is valid: {} packages, {} channels, {} bundles",
        model.len(),
        channels,
        model.bundles().count()
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CATALOG: &str = r#"---
schema: olm.package
name: etcd
defaultChannel: stable
---
schema: olm.channel
package: etcd
name: stable
entries:
  - name: etcd.v1.0.0
  - name: etcd.v1.1.0
    replaces: etcd.v1.0.0
---
schema: olm.bundle
package: etcd
name: etcd.v1.0.0
image: registry.example.com/etcd:1.0.0
properties:
  - type: olm.package
    value: {packageName: etcd, version: 1.0.0}
---
schema: olm.bundle
package: etcd
name: etcd.v1.1.0
image: registry.example.com/etcd:1.1.0
properties:
  - type: olm.package
    value: {packageName: etcd, version: 1.1.0}
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write catalog");
        path
    }

    #[test]
    fn test_validate_summary() {
        let dir = TempDir::new().expect("temp dir");
        let args = ValidateArgs {
            files: vec![write(&dir, "catalog.yaml", CATALOG)],
        };
        let out = summary(&args).expect("valid catalog");
        assert_eq!(out, "catalog is valid: 1 packages, 1 channels, 2 bundles");
    }

    #[test]
    fn test_validate_reports_tree() {
        let dir = TempDir::new().expect("temp dir");
        let broken = CATALOG.replace("defaultChannel: stable", "defaultChannel: fast");
        let args = ValidateArgs {
            files: vec![write(&dir, "catalog.yaml", &broken)],
        };
        let err = summary(&args).expect_err("default channel missing").to_string();
        assert!(err.contains("invalid package \"etcd\""), "got: {err}");
        assert!(err.contains("invalid channel \"fast\""), "got: {err}");
        assert!(err.contains("channel must contain at least one bundle"), "got: {err}");
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let args = ValidateArgs {
            files: vec![dir.path().join("absent.json")],
        };
        let err = summary(&args).expect_err("file absent").to_string();
        assert!(err.contains("Failed to read file"), "got: {err}");
    }
}
