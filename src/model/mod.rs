//! Validated catalog model
//!
//! Ownership runs one way: a [`Model`] owns its packages, a [`Package`] owns
//! its channels and a [`Channel`] owns its bundles. The `package` and
//! `channel` fields on children are plain names used for navigation only.
//!
//! A bundle that is a member of several channels is stored once per channel.

mod normalize;
mod validate;

use std::collections::BTreeMap;

use semver::Version;

use crate::declcfg::{Icon, RelatedImage};
use crate::error::Violation;
use crate::graph::{ChannelGraph, GraphEntry};
use crate::property::{Properties, Property};

/// Message attached to a deprecated package, channel or bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deprecation {
    pub message: String,
}

impl Deprecation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every package of a catalog, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub packages: BTreeMap<String, Package>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    pub fn insert(&mut self, package: Package) {
        self.packages.insert(package.name.clone(), package);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Every bundle of every channel, in package, channel, bundle order
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.packages
            .values()
            .flat_map(|p| p.channels.values())
            .flat_map(|c| c.bundles.values())
    }

    /// Channel `channel` of package `package`
    pub fn channel(&self, package: &str, channel: &str) -> Option<&Channel> {
        self.packages
            .get(package)
            .and_then(|p| p.channels.get(channel))
    }

    /// The channel in this model mirroring `source`, created empty when missing
    ///
    /// Package metadata is copied from `package` the first time the package is
    /// seen; existing packages and channels are left as they are.
    pub fn ensure_channel(&mut self, package: &Package, source: &Channel) -> &mut Channel {
        let pkg = self
            .packages
            .entry(package.name.clone())
            .or_insert_with(|| package.without_channels());
        pkg.channels
            .entry(source.name.clone())
            .or_insert_with(|| source.without_bundles())
    }

    /// Copy `bundle` (taken from `package`/`source`) into this model
    pub fn add_bundle(&mut self, package: &Package, source: &Channel, bundle: &Bundle) {
        self.ensure_channel(package, source)
            .bundles
            .insert(bundle.name.clone(), bundle.clone());
    }

    /// Drop channels without bundles, then packages without channels
    pub fn prune_empty(&mut self) {
        for pkg in self.packages.values_mut() {
            pkg.channels.retain(|_, ch| !ch.bundles.is_empty());
        }
        self.packages.retain(|_, pkg| !pkg.channels.is_empty());
    }
}

/// A package and its channels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    pub name: String,
    pub description: String,
    pub icon: Option<Icon>,
    /// Name of the default channel
    pub default_channel: String,
    pub channels: BTreeMap<String, Channel>,
    pub properties: Vec<Property>,
    pub deprecation: Option<Deprecation>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy of this package's metadata with no channels
    pub fn without_channels(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            default_channel: self.default_channel.clone(),
            channels: BTreeMap::new(),
            properties: self.properties.clone(),
            deprecation: self.deprecation.clone(),
        }
    }

    pub fn default_channel(&self) -> Option<&Channel> {
        self.channels.get(&self.default_channel)
    }

    /// First bundle named `name` in any channel (channels in name order)
    pub fn find_bundle(&self, name: &str) -> Option<&Bundle> {
        self.channels.values().find_map(|c| c.bundles.get(name))
    }
}

/// A named upgrade track of a package
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channel {
    /// Name of the owning package
    pub package: String,
    pub name: String,
    pub bundles: BTreeMap<String, Bundle>,
    pub properties: Vec<Property>,
    pub deprecation: Option<Deprecation>,
}

impl Channel {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Copy of this channel's metadata with no bundles
    pub fn without_bundles(&self) -> Self {
        Self {
            package: self.package.clone(),
            name: self.name.clone(),
            bundles: BTreeMap::new(),
            properties: self.properties.clone(),
            deprecation: self.deprecation.clone(),
        }
    }

    /// The bundle no other bundle replaces or skips
    ///
    /// # Errors
    ///
    /// Returns the channel graph's head problem (`NoHead` or
    /// `MultipleHeads`), otherwise its first violation.
    pub fn head(&self) -> std::result::Result<&Bundle, Violation> {
        let graph = self.graph().map_err(head_violation)?;
        self.bundles.get(graph.head()).ok_or(Violation::NoHead)
    }

    /// Full graph validation of this channel's bundles
    pub fn graph(&self) -> std::result::Result<ChannelGraph, Vec<Violation>> {
        ChannelGraph::build(self.bundles.values().map(|b| GraphEntry {
            name: &b.name,
            replaces: &b.replaces,
            skips: &b.skips,
        }))
    }
}

fn head_violation(violations: Vec<Violation>) -> Violation {
    let mut rest = Vec::new();
    for v in violations {
        if matches!(v, Violation::NoHead | Violation::MultipleHeads { .. }) {
            return v;
        }
        rest.push(v);
    }
    rest.into_iter().next().unwrap_or(Violation::NoHead)
}

/// One versioned release of a package, as a member of one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Name of the owning package
    pub package: String,
    /// Name of the owning channel
    pub channel: String,
    pub name: String,
    pub image: String,
    pub version: Version,
    pub replaces: String,
    pub skips: Vec<String>,
    pub skip_range: String,
    /// Raw properties, without in-bundle channel membership facts
    pub properties: Vec<Property>,
    pub parsed: Properties,
    pub related_images: Vec<RelatedImage>,
    pub csv_json: String,
    pub objects: Vec<String>,
    pub deprecation: Option<Deprecation>,
}

impl Bundle {
    /// A bundle with the given identity and an `olm.package` property
    pub fn new(
        package: impl Into<String>,
        channel: impl Into<String>,
        name: impl Into<String>,
        version: Version,
    ) -> Self {
        let package = package.into();
        let properties = vec![Property::package(package.clone(), version.to_string())];
        let parsed = Properties::parse(&properties).unwrap_or_default();
        Self {
            package,
            channel: channel.into(),
            name: name.into(),
            image: String::new(),
            version,
            replaces: String::new(),
            skips: Vec::new(),
            skip_range: String::new(),
            properties,
            parsed,
            related_images: Vec::new(),
            csv_json: String::new(),
            objects: Vec::new(),
            deprecation: None,
        }
    }

    /// Copy of this bundle re-homed into `channel`
    pub fn in_channel(&self, channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests;
