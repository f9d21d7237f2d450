//! Model → record set

use std::collections::BTreeSet;

use crate::declcfg::{
    self, ChannelEntry, DeclarativeConfig, DeprecationEntry, PackageScopedReference,
    SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS, SCHEMA_PACKAGE,
};
use crate::model::{Bundle, Model, Package};

/// Flatten a model back into records
///
/// Packages come out in name order, each followed by its channels. A bundle
/// that sits in several channels is emitted once, from the first channel in
/// name order. Pass-through records are not part of the model and are not
/// emitted.
pub fn from_model(model: &Model) -> DeclarativeConfig {
    let mut cfg = DeclarativeConfig::new();

    for pkg in model.packages.values() {
        cfg.packages.push(declcfg::Package {
            schema: SCHEMA_PACKAGE.to_string(),
            name: pkg.name.clone(),
            default_channel: pkg.default_channel.clone(),
            icon: pkg.icon.clone(),
            description: pkg.description.clone(),
            properties: pkg.properties.clone(),
        });

        let mut emitted = BTreeSet::new();
        for ch in pkg.channels.values() {
            cfg.channels.push(declcfg::Channel {
                schema: SCHEMA_CHANNEL.to_string(),
                name: ch.name.clone(),
                package: pkg.name.clone(),
                entries: ch.bundles.values().map(channel_entry).collect(),
                properties: ch.properties.clone(),
            });

            for b in ch.bundles.values() {
                if emitted.insert(b.name.as_str()) {
                    cfg.bundles.push(bundle_record(b));
                }
            }
        }

        if let Some(deprecation) = deprecation_record(pkg) {
            cfg.deprecations.push(deprecation);
        }
    }

    cfg
}

fn channel_entry(b: &Bundle) -> ChannelEntry {
    ChannelEntry {
        name: b.name.clone(),
        replaces: b.replaces.clone(),
        skips: b.skips.clone(),
        skip_range: b.skip_range.clone(),
    }
}

fn bundle_record(b: &Bundle) -> declcfg::Bundle {
    declcfg::Bundle {
        schema: SCHEMA_BUNDLE.to_string(),
        name: b.name.clone(),
        package: b.package.clone(),
        image: b.image.clone(),
        properties: b.properties.clone(),
        related_images: b.related_images.clone(),
        csv_json: b.csv_json.clone(),
        objects: b.objects.clone(),
    }
}

fn deprecation_record(pkg: &Package) -> Option<declcfg::Deprecation> {
    let entry = |schema: &str, name: &str, message: &str| DeprecationEntry {
        reference: PackageScopedReference {
            schema: schema.to_string(),
            name: name.to_string(),
        },
        message: message.to_string(),
    };

    let mut entries = Vec::new();
    if let Some(d) = &pkg.deprecation {
        entries.push(entry(SCHEMA_PACKAGE, "", &d.message));
    }
    for ch in pkg.channels.values() {
        if let Some(d) = &ch.deprecation {
            entries.push(entry(SCHEMA_CHANNEL, &ch.name, &d.message));
        }
    }
    let mut seen = BTreeSet::new();
    for b in pkg.channels.values().flat_map(|c| c.bundles.values()) {
        let Some(d) = &b.deprecation else {
            continue;
        };
        if seen.insert(b.name.as_str()) {
            entries.push(entry(SCHEMA_BUNDLE, &b.name, &d.message));
        }
    }

    (!entries.is_empty()).then(|| declcfg::Deprecation {
        schema: SCHEMA_DEPRECATIONS.to_string(),
        package: pkg.name.clone(),
        entries,
    })
}
