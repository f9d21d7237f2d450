//! Flat catalog records
//!
//! The record set is the loosely-validated, order-independent shape a catalog
//! has on disk or on the wire. Nothing here checks cross references; that is
//! the job of [`crate::convert::to_model`].

pub mod decode;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::property::Property;

pub const SCHEMA_PACKAGE: &str = "olm.package";
pub const SCHEMA_CHANNEL: &str = "olm.channel";
pub const SCHEMA_BUNDLE: &str = "olm.bundle";
pub const SCHEMA_DEPRECATIONS: &str = "olm.deprecations";

fn package_schema() -> String {
    SCHEMA_PACKAGE.to_string()
}

fn channel_schema() -> String {
    SCHEMA_CHANNEL.to_string()
}

fn bundle_schema() -> String {
    SCHEMA_BUNDLE.to_string()
}

fn deprecations_schema() -> String {
    SCHEMA_DEPRECATIONS.to_string()
}

/// A complete record set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarativeConfig {
    pub packages: Vec<Package>,
    pub channels: Vec<Channel>,
    pub bundles: Vec<Bundle>,
    pub deprecations: Vec<Deprecation>,
    pub others: Vec<Meta>,
}

impl DeclarativeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every record of `other`
    pub fn merge(&mut self, other: DeclarativeConfig) {
        self.packages.extend(other.packages);
        self.channels.extend(other.channels);
        self.bundles.extend(other.bundles);
        self.deprecations.extend(other.deprecations);
        self.others.extend(other.others);
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
            && self.channels.is_empty()
            && self.bundles.is_empty()
            && self.deprecations.is_empty()
            && self.others.is_empty()
    }
}

/// `olm.package`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default = "package_schema")]
    pub schema: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "base64data", default)]
    pub data: String,
    #[serde(rename = "mediatype", default)]
    pub media_type: String,
}

/// `olm.channel`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default = "channel_schema")]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub entries: Vec<ChannelEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replaces: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skips: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skip_range: String,
}

impl ChannelEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn replacing(name: impl Into<String>, replaces: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replaces: replaces.into(),
            ..Self::default()
        }
    }
}

/// `olm.bundle`
///
/// `csv_json` and `objects` are denormalized copies of the bundle's manifests.
/// A loader fills them from `olm.bundle.object` properties; they are never
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "bundle_schema")]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_images: Vec<RelatedImage>,
    #[serde(skip)]
    pub csv_json: String,
    #[serde(skip)]
    pub objects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelatedImage {
    #[serde(default)]
    pub name: String,
    pub image: String,
}

/// `olm.deprecations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default = "deprecations_schema")]
    pub schema: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub entries: Vec<DeprecationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationEntry {
    pub reference: PackageScopedReference,
    #[serde(default)]
    pub message: String,
}

/// Reference to an object inside the deprecation's package
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageScopedReference {
    #[serde(default)]
    pub schema: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Any other record, kept whole
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub schema: String,
    pub package: String,
    pub name: String,
    pub blob: Value,
}
