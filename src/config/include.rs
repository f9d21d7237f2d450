//! Include file data structures
//!
//! ```yaml
//! packages:
//!   - name: etcd
//!     channels:
//!       - name: stable
//!         versions: ["1.0.0"]
//!         skipMissing: false
//!     range: ">=1.0.0"
//! ```

use std::path::Path;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::diff::{DiffIncludeChannel, DiffIncludePackage, DiffIncluder};
use crate::error::Result;
use crate::error::config::{invalid, parse_failed};
use crate::error::fs::read_failed;
use crate::version::{VersionRange, parse_version};

/// Include file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeConfig {
    /// Packages to include
    #[serde(default)]
    pub packages: Vec<IncludePackageConfig>,
}

/// One package entry of an include file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludePackageConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<IncludeChannelConfig>,

    /// Versions to include from every channel
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,

    /// Bundle names to include from every channel
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// One channel entry of a package entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncludeChannelConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// Versions and bundles absent from this channel are not an error
    #[serde(default)]
    pub skip_missing: bool,
}

impl IncludeConfig {
    /// Parse include configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse an include file
    ///
    /// Errors name the file they came from.
    pub fn from_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let yaml =
            std::fs::read_to_string(path).map_err(|e| read_failed(&display, e.to_string()))?;
        let config: Self =
            serde_yaml::from_str(&yaml).map_err(|e| parse_failed(&display, e.to_string()))?;
        config
            .validate()
            .map_err(|e| parse_failed(&display, e.to_string()))?;
        Ok(config)
    }

    /// Validate names and that every version and range parses
    pub fn validate(&self) -> Result<()> {
        self.to_includer().map(|_| ())
    }

    /// Typed include directives
    pub fn to_includer(&self) -> Result<DiffIncluder> {
        let packages = self
            .packages
            .iter()
            .map(IncludePackageConfig::to_directive)
            .collect::<Result<Vec<_>>>()?;
        Ok(DiffIncluder { packages })
    }

    /// Serialize include configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn versions(list: &[String]) -> Result<Vec<Version>> {
    list.iter().map(|v| parse_version(v)).collect()
}

fn range(raw: Option<&String>) -> Result<Option<VersionRange>> {
    raw.map(|r| VersionRange::parse(r)).transpose()
}

impl IncludePackageConfig {
    fn to_directive(&self) -> Result<DiffIncludePackage> {
        if self.name.is_empty() {
            return Err(invalid("package name cannot be empty"));
        }
        let channels = self
            .channels
            .iter()
            .map(|ch| ch.to_directive(&self.name))
            .collect::<Result<Vec<_>>>()?;
        Ok(DiffIncludePackage {
            name: self.name.clone(),
            channels,
            versions: versions(&self.versions)?,
            bundles: self.bundles.clone(),
            range: range(self.range.as_ref())?,
        })
    }
}

impl IncludeChannelConfig {
    fn to_directive(&self, package: &str) -> Result<DiffIncludeChannel> {
        if self.name.is_empty() {
            return Err(invalid(format!(
                "channel name cannot be empty in package {package:?}"
            )));
        }
        Ok(DiffIncludeChannel {
            name: self.name.clone(),
            versions: versions(&self.versions)?,
            bundles: self.bundles.clone(),
            range: range(self.range.as_ref())?,
            skip_missing: self.skip_missing,
        })
    }
}
