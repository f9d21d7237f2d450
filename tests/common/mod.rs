//! Common test utilities for opcat integration tests

use std::fmt::Write as _;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding catalog files
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace and return its path
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }
}

/// YAML catalog of one package with a single linear channel
///
/// Bundles are named `{package}.v{version}`; each replaces the one before.
#[allow(dead_code)]
pub fn linear_catalog(package: &str, channel: &str, versions: &[&str]) -> String {
    let mut out = format!(
        "---\nschema: olm.package\nname: {package}\ndefaultChannel: {channel}\n\
         ---\nschema: olm.channel\npackage: {package}\nname: {channel}\nentries:\n"
    );
    let mut prev: Option<&str> = None;
    for v in versions {
        let _ = writeln!(out, "  - name: {package}.v{v}");
        if let Some(p) = prev {
            let _ = writeln!(out, "    replaces: {package}.v{p}");
        }
        prev = Some(v);
    }
    for v in versions {
        out.push_str(&bundle_yaml(package, v, ""));
    }
    out
}

/// One `olm.bundle` document; `extra` is appended to the property list
#[allow(dead_code)]
pub fn bundle_yaml(package: &str, version: &str, extra: &str) -> String {
    format!(
        "---\nschema: olm.bundle\npackage: {package}\nname: {package}.v{version}\n\
         image: registry.example.com/{package}:{version}\nproperties:\n  \
         - type: olm.package\n    value: {{packageName: {package}, version: {version}}}\n{extra}"
    )
}

/// Path to opcat binary
#[allow(dead_code)]
pub fn opcat_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_opcat"))
}
