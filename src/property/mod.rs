//! Property registry
//!
//! Bundles describe themselves through an open list of `{type, value}` pairs.
//! The kinds this crate understands form the closed [`Fact`] enum; anything
//! else is carried through untouched as [`Fact::Other`].
//!
//! [`Properties::parse`] decodes a whole list at once and groups the results
//! by kind. It does not enforce cardinality (e.g. "exactly one `olm.package`");
//! callers decide what counts as too many or too few.

pub mod types;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::error::property::parse_failed;

pub use types::{
    BundleObject, ChannelFact, CsvMetadata, Gvk, Link, Maintainer, PackageFact, PackageRequired,
    Provider, SearchMetadataItem,
};

pub const TYPE_PACKAGE: &str = "olm.package";
pub const TYPE_PACKAGE_REQUIRED: &str = "olm.package.required";
pub const TYPE_GVK: &str = "olm.gvk";
pub const TYPE_GVK_REQUIRED: &str = "olm.gvk.required";
pub const TYPE_BUNDLE_OBJECT: &str = "olm.bundle.object";
pub const TYPE_CHANNEL: &str = "olm.channel";
pub const TYPE_SKIPS: &str = "olm.skips";
pub const TYPE_SKIP_RANGE: &str = "olm.skipRange";
pub const TYPE_CSV_METADATA: &str = "olm.csv.metadata";
pub const TYPE_SEARCH_METADATA: &str = "olm.search.metadata";

/// A raw `{type, value}` pair as it appears in records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: String,
    pub value: Value,
}

impl Property {
    pub fn new(property_type: impl Into<String>, value: Value) -> Self {
        Self {
            property_type: property_type.into(),
            value,
        }
    }

    pub fn package(name: impl Into<String>, version: impl Into<String>) -> Self {
        Fact::Package(PackageFact {
            package_name: name.into(),
            version: version.into(),
        })
        .to_property()
    }

    pub fn package_required(name: impl Into<String>, range: impl Into<String>) -> Self {
        Fact::PackageRequired(PackageRequired {
            package_name: name.into(),
            version_range: range.into(),
        })
        .to_property()
    }

    pub fn gvk(group: &str, version: &str, kind: &str) -> Self {
        Fact::Gvk(Gvk::new(group, version, kind)).to_property()
    }

    pub fn gvk_required(group: &str, version: &str, kind: &str) -> Self {
        Fact::GvkRequired(Gvk::new(group, version, kind)).to_property()
    }

    pub fn channel(name: impl Into<String>, replaces: impl Into<String>) -> Self {
        Fact::Channel(ChannelFact {
            channel_name: name.into(),
            replaces: replaces.into(),
        })
        .to_property()
    }

    pub fn skips(name: impl Into<String>) -> Self {
        Fact::Skips(name.into()).to_property()
    }

    pub fn skip_range(range: impl Into<String>) -> Self {
        Fact::SkipRange(range.into()).to_property()
    }

    pub fn bundle_object(data: impl Into<String>) -> Self {
        Fact::BundleObject(BundleObject {
            data: Some(data.into()),
            reference: None,
        })
        .to_property()
    }

    /// Whether this property declares channel membership inside a bundle
    pub fn is_channel_membership(&self) -> bool {
        matches!(
            self.property_type.as_str(),
            TYPE_CHANNEL | TYPE_SKIPS | TYPE_SKIP_RANGE
        )
    }
}

/// A decoded property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Package(PackageFact),
    PackageRequired(PackageRequired),
    Gvk(Gvk),
    GvkRequired(Gvk),
    BundleObject(BundleObject),
    Channel(ChannelFact),
    Skips(String),
    SkipRange(String),
    CsvMetadata(Box<CsvMetadata>),
    SearchMetadata(Vec<SearchMetadataItem>),
    Other(Property),
}

fn decode<T: DeserializeOwned>(value: &Value) -> std::result::Result<T, serde_json::Error> {
    T::deserialize(value)
}

fn encode<T: Serialize>(value: &T) -> Value {
    // Every fact type serializes to a plain JSON tree.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Fact {
    /// Decode one property according to its type
    pub fn decode(property: &Property) -> std::result::Result<Fact, serde_json::Error> {
        let value = &property.value;
        Ok(match property.property_type.as_str() {
            TYPE_PACKAGE => Fact::Package(decode(value)?),
            TYPE_PACKAGE_REQUIRED => Fact::PackageRequired(decode(value)?),
            TYPE_GVK => Fact::Gvk(decode(value)?),
            TYPE_GVK_REQUIRED => Fact::GvkRequired(decode(value)?),
            TYPE_BUNDLE_OBJECT => Fact::BundleObject(decode(value)?),
            TYPE_CHANNEL => Fact::Channel(decode(value)?),
            TYPE_SKIPS => Fact::Skips(decode(value)?),
            TYPE_SKIP_RANGE => Fact::SkipRange(decode(value)?),
            TYPE_CSV_METADATA => Fact::CsvMetadata(Box::new(decode(value)?)),
            TYPE_SEARCH_METADATA => Fact::SearchMetadata(decode(value)?),
            _ => Fact::Other(property.clone()),
        })
    }

    pub fn type_name(&self) -> &str {
        match self {
            Fact::Package(_) => TYPE_PACKAGE,
            Fact::PackageRequired(_) => TYPE_PACKAGE_REQUIRED,
            Fact::Gvk(_) => TYPE_GVK,
            Fact::GvkRequired(_) => TYPE_GVK_REQUIRED,
            Fact::BundleObject(_) => TYPE_BUNDLE_OBJECT,
            Fact::Channel(_) => TYPE_CHANNEL,
            Fact::Skips(_) => TYPE_SKIPS,
            Fact::SkipRange(_) => TYPE_SKIP_RANGE,
            Fact::CsvMetadata(_) => TYPE_CSV_METADATA,
            Fact::SearchMetadata(_) => TYPE_SEARCH_METADATA,
            Fact::Other(p) => &p.property_type,
        }
    }

    /// Encode back into a raw property
    pub fn to_property(&self) -> Property {
        let value = match self {
            Fact::Package(v) => encode(v),
            Fact::PackageRequired(v) => encode(v),
            Fact::Gvk(v) | Fact::GvkRequired(v) => encode(v),
            Fact::BundleObject(v) => encode(v),
            Fact::Channel(v) => encode(v),
            Fact::Skips(v) | Fact::SkipRange(v) => Value::String(v.clone()),
            Fact::CsvMetadata(v) => encode(v),
            Fact::SearchMetadata(v) => encode(v),
            Fact::Other(p) => return p.clone(),
        };
        Property::new(self.type_name(), value)
    }
}

/// Decoded properties grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub packages: Vec<PackageFact>,
    pub packages_required: Vec<PackageRequired>,
    pub gvks: Vec<Gvk>,
    pub gvks_required: Vec<Gvk>,
    pub bundle_objects: Vec<BundleObject>,
    pub channels: Vec<ChannelFact>,
    pub skips: Vec<String>,
    pub skip_ranges: Vec<String>,
    pub csv_metadatas: Vec<CsvMetadata>,
    pub search_metadatas: Vec<Vec<SearchMetadataItem>>,
    pub others: Vec<Property>,
}

impl Properties {
    /// Decode every property, grouping the results by kind
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::PropertyParse` naming the index and type of the
    /// first property whose value does not match its type.
    pub fn parse(properties: &[Property]) -> Result<Self> {
        let mut out = Self::default();
        for (index, property) in properties.iter().enumerate() {
            let fact = Fact::decode(property)
                .map_err(|e| parse_failed(index, &property.property_type, e.to_string()))?;
            out.push(fact);
        }
        Ok(out)
    }

    fn push(&mut self, fact: Fact) {
        match fact {
            Fact::Package(v) => self.packages.push(v),
            Fact::PackageRequired(v) => self.packages_required.push(v),
            Fact::Gvk(v) => self.gvks.push(v),
            Fact::GvkRequired(v) => self.gvks_required.push(v),
            Fact::BundleObject(v) => self.bundle_objects.push(v),
            Fact::Channel(v) => self.channels.push(v),
            Fact::Skips(v) => self.skips.push(v),
            Fact::SkipRange(v) => self.skip_ranges.push(v),
            Fact::CsvMetadata(v) => self.csv_metadatas.push(*v),
            Fact::SearchMetadata(v) => self.search_metadatas.push(v),
            Fact::Other(p) => self.others.push(p),
        }
    }
}

#[cfg(test)]
mod tests;
