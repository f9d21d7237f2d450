//! Test fixtures for building record sets and models with little ceremony.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{bundle, channel, package, record_set};
//!
//! #[test]
//! fn my_test() {
//!     let cfg = record_set(
//!         vec![package("etcd", "stable")],
//!         vec![channel("etcd", "stable", &[("etcd.v1", ""), ("etcd.v2", "etcd.v1")])],
//!         vec![bundle("etcd", "etcd.v1", "1.0.0"), bundle("etcd", "etcd.v2", "2.0.0")],
//!     );
//!     let model = model_of(cfg);
//! }
//! ```

#![allow(clippy::panic)]

use crate::convert::to_model;
use crate::declcfg::{
    Bundle, Channel, ChannelEntry, DeclarativeConfig, Package, SCHEMA_BUNDLE, SCHEMA_CHANNEL,
    SCHEMA_PACKAGE,
};
use crate::model::Model;
use crate::property::Property;

/// A package record with the given default channel
#[must_use]
pub fn package(name: &str, default_channel: &str) -> Package {
    Package {
        schema: SCHEMA_PACKAGE.to_string(),
        name: name.to_string(),
        default_channel: default_channel.to_string(),
        ..Package::default()
    }
}

/// A channel record from `(name, replaces)` pairs; an empty `replaces` means none
#[must_use]
pub fn channel(package: &str, name: &str, entries: &[(&str, &str)]) -> Channel {
    Channel {
        schema: SCHEMA_CHANNEL.to_string(),
        name: name.to_string(),
        package: package.to_string(),
        entries: entries
            .iter()
            .map(|(name, replaces)| ChannelEntry::replacing(*name, *replaces))
            .collect(),
        properties: Vec::new(),
    }
}

/// A bundle record with an image and an `olm.package` property
#[must_use]
pub fn bundle(package: &str, name: &str, version: &str) -> Bundle {
    Bundle {
        schema: SCHEMA_BUNDLE.to_string(),
        name: name.to_string(),
        package: package.to_string(),
        image: format!("registry.example.com/{package}:{version}"),
        properties: vec![Property::package(package, version)],
        ..Bundle::default()
    }
}

/// Same as [`bundle`] with extra properties appended
#[must_use]
pub fn bundle_with(package: &str, name: &str, version: &str, extra: Vec<Property>) -> Bundle {
    let mut b = bundle(package, name, version);
    b.properties.extend(extra);
    b
}

#[must_use]
pub fn record_set(packages: Vec<Package>, channels: Vec<Channel>, bundles: Vec<Bundle>) -> DeclarativeConfig {
    DeclarativeConfig {
        packages,
        channels,
        bundles,
        ..DeclarativeConfig::default()
    }
}

/// A single-channel package whose bundles replace one another in the given order
///
/// `versions` runs oldest first; bundle names are `<package>.v<version>`.
#[must_use]
pub fn linear_package(package_name: &str, channel_name: &str, versions: &[&str]) -> DeclarativeConfig {
    let names: Vec<String> = versions
        .iter()
        .map(|v| format!("{package_name}.v{v}"))
        .collect();
    let entries: Vec<(&str, &str)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let replaces = if i == 0 { "" } else { names[i - 1].as_str() };
            (name.as_str(), replaces)
        })
        .collect();

    record_set(
        vec![package(package_name, channel_name)],
        vec![channel(package_name, channel_name, &entries)],
        names
            .iter()
            .zip(versions)
            .map(|(name, v)| bundle(package_name, name, v))
            .collect(),
    )
}

/// Build a model, panicking with the rendered validation tree on failure
///
/// # Panics
///
/// Panics if the record set does not build.
pub fn model_of(cfg: DeclarativeConfig) -> Model {
    match to_model(cfg) {
        Ok(model) => model,
        Err(err) => panic!("record set should build:\n{err}"),
    }
}

/// Build several record sets into one model
pub fn model_of_all(parts: Vec<DeclarativeConfig>) -> Model {
    let mut cfg = DeclarativeConfig::new();
    for part in parts {
        cfg.merge(part);
    }
    model_of(cfg)
}
