//! Explicit include directives for a diff
//!
//! Each package entry selects content of the new catalog:
//!
//! - no selectors: the whole package
//! - `channels`: named channels, each optionally narrowed by `versions`,
//!   `bundles` or a `range`
//! - package-level `versions`/`bundles`: searched in every channel
//! - package-level `range`: applied to every channel
//!
//! Selected bundles are joined to their channel head through
//! [`intersect`](super::intersect::intersect) so the result stays upgradable.

use std::collections::BTreeSet;

use semver::Version;
use tracing::{debug, warn};

use super::intersect::intersect;
use crate::error::Result;
use crate::error::diff::{config, include_failed};
use crate::model::{Bundle, Channel, Model, Package};
use crate::version::VersionRange;

/// Every include directive of a diff
#[derive(Debug, Clone, Default)]
pub struct DiffIncluder {
    pub packages: Vec<DiffIncludePackage>,
}

#[derive(Debug, Clone, Default)]
pub struct DiffIncludePackage {
    pub name: String,
    pub channels: Vec<DiffIncludeChannel>,
    /// Versions to include from every channel
    pub versions: Vec<Version>,
    /// Bundle names to include from every channel
    pub bundles: Vec<String>,
    pub range: Option<VersionRange>,
}

#[derive(Debug, Clone, Default)]
pub struct DiffIncludeChannel {
    pub name: String,
    pub versions: Vec<Version>,
    pub bundles: Vec<String>,
    pub range: Option<VersionRange>,
    /// Versions and bundles absent from this channel are not an error
    pub skip_missing: bool,
}

impl DiffIncludeChannel {
    fn has_selectors(&self) -> bool {
        !self.versions.is_empty() || !self.bundles.is_empty() || self.range.is_some()
    }
}

impl DiffIncludePackage {
    fn has_selectors(&self) -> bool {
        !self.channels.is_empty()
            || !self.versions.is_empty()
            || !self.bundles.is_empty()
            || self.range.is_some()
    }
}

impl DiffIncluder {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check that no mutually exclusive selectors are combined
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DiffConfig` listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        for pkg in &self.packages {
            if pkg.name.is_empty() {
                errors.push("package name cannot be empty".to_string());
                continue;
            }
            let scope = format!("[package={:?}]", pkg.name);
            if pkg.range.is_some() && (!pkg.versions.is_empty() || !pkg.bundles.is_empty()) {
                errors.push(format!(
                    "{scope} package range cannot be set with package versions or bundles"
                ));
            }
            for ch in &pkg.channels {
                if ch.name.is_empty() {
                    errors.push(format!("{scope} channel name cannot be empty"));
                    continue;
                }
                if pkg.range.is_some() && ch.has_selectors() {
                    errors.push(format!(
                        "{scope} package range cannot be set if channel range, versions, or bundles are set"
                    ));
                }
                if ch.range.is_some() && (!ch.versions.is_empty() || !ch.bundles.is_empty()) {
                    errors.push(format!(
                        "[package={:?} channel={:?}] channel range cannot be set with channel versions or bundles",
                        pkg.name, ch.name
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(config(errors.join("; ")))
        }
    }

    /// Copy the selected content of `new` into a fresh model
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Include` with every missing package, channel,
    /// version or bundle across all directives.
    pub fn run(&self, new: &Model) -> Result<Model> {
        self.validate()?;

        let mut out = Model::new();
        let mut errors = Vec::new();
        for ipkg in &self.packages {
            errors.extend(ipkg.include(new, &mut out));
        }
        if !errors.is_empty() {
            return Err(include_failed(errors));
        }

        out.prune_empty();
        debug!(
            packages = out.len(),
            bundles = out.bundles().count(),
            "included requested catalog content"
        );
        Ok(out)
    }
}

impl DiffIncludePackage {
    fn include(&self, new: &Model, out: &mut Model) -> Vec<String> {
        let Some(pkg) = new.get(&self.name) else {
            return vec![format!("[package={:?}] package does not exist in new model", self.name)];
        };

        if !self.has_selectors() {
            out.insert(pkg.clone());
            return Vec::new();
        }

        let mut errors = Vec::new();
        let across_channels = !self.versions.is_empty() || !self.bundles.is_empty();
        let channels: Vec<DiffIncludeChannel> = if across_channels || self.range.is_some() {
            pkg.channels
                .keys()
                .map(|name| DiffIncludeChannel {
                    name: name.clone(),
                    versions: self.versions.clone(),
                    bundles: self.bundles.clone(),
                    range: self.range.clone(),
                    skip_missing: across_channels,
                })
                .chain(self.channels.iter().cloned())
                .collect()
        } else {
            self.channels.clone()
        };

        let mut seen_versions = BTreeSet::new();
        let mut seen_bundles = BTreeSet::new();
        for ich in &channels {
            let Some(ch) = pkg.channels.get(&ich.name) else {
                errors.push(format!(
                    "[package={:?} channel={:?}] channel does not exist in new model",
                    pkg.name, ich.name
                ));
                continue;
            };
            match ich.select(ch) {
                Ok(selected) => {
                    for b in ch.bundles.values().filter(|b| selected.contains(&b.name)) {
                        seen_versions.insert(b.version.clone());
                        seen_bundles.insert(b.name.clone());
                    }
                    add_selected(out, pkg, ch, &selected);
                }
                Err(reason) => errors.push(format!(
                    "[package={:?} channel={:?}] {reason}",
                    pkg.name, ch.name
                )),
            }
        }

        for v in self.versions.iter().filter(|v| !seen_versions.contains(*v)) {
            errors.push(format!(
                "[package={:?}] version {v} not found in any channel",
                pkg.name
            ));
        }
        for name in self.bundles.iter().filter(|n| !seen_bundles.contains(*n)) {
            errors.push(format!(
                "[package={:?}] bundle {name:?} not found in any channel",
                pkg.name
            ));
        }
        errors
    }
}

impl DiffIncludeChannel {
    /// Names of the bundles to copy from `ch`, upgrade paths included
    fn select(&self, ch: &Channel) -> std::result::Result<BTreeSet<String>, String> {
        if !self.has_selectors() {
            return Ok(ch.bundles.keys().cloned().collect());
        }

        let picked: Vec<&Bundle> = ch
            .bundles
            .values()
            .filter(|b| {
                self.versions.contains(&b.version)
                    || self.bundles.contains(&b.name)
                    || self.range.as_ref().is_some_and(|r| r.matches(&b.version))
            })
            .collect();

        if self.range.is_none() && !self.skip_missing {
            let missing = self.missing(&picked);
            if !missing.is_empty() {
                return Err(format!("could not find versions/bundles: {}", missing.join(", ")));
            }
        }
        if picked.is_empty() {
            return Ok(BTreeSet::new());
        }

        let head = ch.head().map_err(|v| v.to_string())?;
        let mut selected = BTreeSet::new();
        for b in picked {
            let (path, found) = intersect(ch, b, head);
            if found {
                selected.extend(path);
            } else {
                warn!(
                    channel = %ch.name,
                    head = %head.name,
                    bundle = %b.name,
                    "channel head not reachable from bundle, including it without upgrade graph"
                );
                selected.insert(b.name.clone());
            }
        }
        Ok(selected)
    }

    /// Requested versions and bundle names that `picked` does not cover
    fn missing(&self, picked: &[&Bundle]) -> Vec<String> {
        let versions = self
            .versions
            .iter()
            .filter(|v| !picked.iter().any(|b| &b.version == *v))
            .map(ToString::to_string);
        let names = self
            .bundles
            .iter()
            .filter(|n| !picked.iter().any(|b| &b.name == *n))
            .map(|n| format!("{n:?}"));
        versions.chain(names).collect()
    }
}

fn add_selected(out: &mut Model, pkg: &Package, ch: &Channel, selected: &BTreeSet<String>) {
    if selected.is_empty() {
        return;
    }
    let target = out.ensure_channel(pkg, ch);
    for b in ch.bundles.values().filter(|b| selected.contains(&b.name)) {
        target.bundles.insert(b.name.clone(), b.clone());
    }
}

