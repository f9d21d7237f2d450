//! Structural validation of a model
//!
//! Each level validates itself and hands its findings to the parent as a
//! child node, so the final tree mirrors package → channel → bundle.

use std::collections::{BTreeMap, BTreeSet};

use semver::Version;

use super::{Bundle, Channel, Deprecation, Model, Package};
use crate::error::{Scope, ValidationError, Violation};
use crate::property::Properties;

impl Model {
    /// Check every structural invariant
    ///
    /// # Errors
    ///
    /// Returns the full validation tree when anything is wrong.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut root = ValidationError::new(Scope::Catalog);
        self.validate_into(&mut root);
        root.into_result()
    }

    pub(crate) fn validate_into(&self, root: &mut ValidationError) {
        for (key, pkg) in &self.packages {
            if key != &pkg.name {
                root.push(Violation::PackageKeyMismatch {
                    key: key.clone(),
                    name: pkg.name.clone(),
                });
            }
            root.push_child(pkg.validate());
        }
    }
}

fn check_deprecation(deprecation: Option<&Deprecation>, node: &mut ValidationError) {
    if deprecation.is_some_and(|d| d.message.is_empty()) {
        node.push(Violation::DeprecationMessageUnset);
    }
}

impl Package {
    /// Validate this package and everything it owns
    pub fn validate(&self) -> ValidationError {
        let mut node = ValidationError::new(Scope::Package(self.name.clone()));

        if self.name.is_empty() {
            node.push(Violation::PackageNameUnset);
        }
        if self.default_channel.is_empty() {
            node.push(Violation::DefaultChannelUnset);
        } else if !self.channels.contains_key(&self.default_channel) {
            node.push(Violation::DefaultChannelNotFound {
                name: self.default_channel.clone(),
            });
        }
        if self.channels.is_empty() {
            node.push(Violation::NoChannels);
        }

        for (key, ch) in &self.channels {
            if key != &ch.name {
                node.push(Violation::ChannelKeyMismatch {
                    key: key.clone(),
                    name: ch.name.clone(),
                });
            }
            if ch.package != self.name {
                node.push(Violation::ChannelNotLinked {
                    name: ch.name.clone(),
                });
            }
            node.push_child(ch.validate());
        }

        if let Some(duplicates) = self.duplicate_versions() {
            node.push(duplicates);
        }
        check_deprecation(self.deprecation.as_ref(), &mut node);
        node
    }

    /// Versions used by more than one distinct bundle name
    fn duplicate_versions(&self) -> Option<Violation> {
        let mut names_by_version: BTreeMap<&Version, BTreeSet<&str>> = BTreeMap::new();
        for b in self.channels.values().flat_map(|c| c.bundles.values()) {
            names_by_version
                .entry(&b.version)
                .or_default()
                .insert(b.name.as_str());
        }

        let versions: Vec<(String, Vec<String>)> = names_by_version
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(v, names)| (v.to_string(), names.into_iter().map(str::to_string).collect()))
            .collect();

        (!versions.is_empty()).then_some(Violation::DuplicateVersions { versions })
    }
}

impl Channel {
    /// Validate this channel, its upgrade graph and its bundles
    pub fn validate(&self) -> ValidationError {
        let mut node = ValidationError::new(Scope::Channel(self.name.clone()));

        if self.name.is_empty() {
            node.push(Violation::EmptyChannelName);
        }
        if self.bundles.is_empty() {
            node.push(Violation::EmptyChannel);
        } else {
            match self.graph() {
                Ok(graph) => {
                    let bundles = graph.stranded();
                    if !bundles.is_empty() {
                        node.push(Violation::StrandedBundles { bundles });
                    }
                }
                Err(violations) => {
                    for v in violations {
                        node.push(v);
                    }
                }
            }
        }

        for (key, b) in &self.bundles {
            if key != &b.name {
                node.push(Violation::BundleKeyMismatch {
                    key: key.clone(),
                    name: b.name.clone(),
                });
            }
            if b.channel != self.name {
                node.push(Violation::BundleNotLinked {
                    name: b.name.clone(),
                });
            }
            let mut bundle_node = b.validate();
            if b.package != self.package {
                bundle_node.push(Violation::PackageMismatch);
            }
            node.push_child(bundle_node);
        }

        check_deprecation(self.deprecation.as_ref(), &mut node);
        node
    }
}

impl Bundle {
    /// Validate the bundle's own fields
    pub fn validate(&self) -> ValidationError {
        let mut node = ValidationError::new(Scope::Bundle(self.name.clone()));

        if self.name.is_empty() {
            node.push(Violation::BundleNameUnset);
        }

        match Properties::parse(&self.properties) {
            Ok(props) if props.packages.len() != 1 => node.push(Violation::PackagePropertyCount {
                found: props.packages.len(),
            }),
            Ok(_) => {}
            Err(err) => node.push(Violation::from_property_error(err)),
        }

        for (index, skip) in self.skips.iter().enumerate() {
            if skip.is_empty() {
                node.push(Violation::EmptySkip { index });
            }
        }

        if self.image.is_empty() && self.objects.is_empty() && self.parsed.bundle_objects.is_empty()
        {
            node.push(Violation::ImageUnset);
        }

        check_deprecation(self.deprecation.as_ref(), &mut node);
        node
    }
}
