//! Record set → validated model
//!
//! ## Procedure
//!
//! 1. Register packages, remembering each declared default channel name.
//! 2. For packages with `olm.channel` records, build each channel's graph and
//!    keep its entries as stubs waiting for bundle data.
//! 3. Decode every bundle's properties and resolve its version from the single
//!    `olm.package` property.
//! 4. Attach the bundle to its stubs, or, for packages without channel
//!    records, create channels from the bundle's own `olm.channel` facts.
//! 5. Report stubs no bundle claimed.
//! 6. Give each package a default channel object, empty if it was never
//!    populated (validation then reports it as empty).
//! 7. Apply deprecations and run structural validation.
//! 8. Normalize.
//!
//! Problems are collected into one [`ValidationError`] tree rather than
//! returned one at a time.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::declcfg::{
    self, ChannelEntry, DeclarativeConfig, SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS,
    SCHEMA_PACKAGE,
};
use crate::error::{CatalogError, Result, Scope, ValidationError, Violation};
use crate::graph::{ChannelGraph, GraphEntry};
use crate::model::{Bundle, Channel, Deprecation, Model, Package};
use crate::property::{Properties, TYPE_CHANNEL, TYPE_SKIP_RANGE, TYPE_SKIPS};

const DNS1123_LABEL_MAX_LENGTH: usize = 63;

/// Check a package name against the RFC 1123 label rules
pub fn validate_package_name(name: &str) -> std::result::Result<(), String> {
    if name.len() > DNS1123_LABEL_MAX_LENGTH {
        return Err(format!(
            "must be no more than {DNS1123_LABEL_MAX_LENGTH} characters"
        ));
    }
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let alnum_edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !valid_chars || !alnum_edge(name.chars().next()) || !alnum_edge(name.chars().last()) {
        return Err("a lowercase RFC 1123 label must consist of lower case alphanumeric \
                    characters or '-', and must start and end with an alphanumeric character"
            .to_string());
    }
    Ok(())
}

/// Entries of `olm.channel` records still waiting for their bundle
#[derive(Default)]
struct Stubs {
    /// bundle name → (channel name, entry)
    by_bundle: BTreeMap<String, Vec<(String, ChannelEntry)>>,
}

struct Builder {
    model: Model,
    root: ValidationError,
    /// Packages whose channels come from `olm.channel` records
    record_style: BTreeMap<String, Stubs>,
    bundle_names: BTreeMap<String, BTreeSet<String>>,
}

/// Build a validated model from a record set
///
/// # Errors
///
/// Returns `CatalogError::InvalidModel` carrying every problem found.
pub fn to_model(cfg: DeclarativeConfig) -> Result<Model> {
    let mut builder = Builder {
        model: Model::new(),
        root: ValidationError::new(Scope::Catalog),
        record_style: BTreeMap::new(),
        bundle_names: BTreeMap::new(),
    };

    builder.add_packages(cfg.packages);
    builder.add_channels(cfg.channels);
    for bundle in cfg.bundles {
        builder.add_bundle(bundle);
    }
    builder.report_unclaimed_entries();
    builder.resolve_default_channels();
    builder.apply_deprecations(cfg.deprecations);

    let Builder {
        mut model,
        mut root,
        ..
    } = builder;
    model.validate_into(&mut root);
    root.into_result().map_err(CatalogError::InvalidModel)?;

    model.normalize();
    debug!(
        packages = model.len(),
        bundles = model.bundles().count(),
        "built catalog model"
    );
    Ok(model)
}

impl Builder {
    fn package_node(&mut self, package: &str) -> &mut ValidationError {
        self.root.child_mut(Scope::Package(package.to_string()))
    }

    /// Whether records referencing `package` can be attached, reporting why not
    fn check_package_ref(&mut self, schema: &str, name: &str, package: &str) -> bool {
        if package.is_empty() {
            self.root.push(Violation::MissingPackage {
                schema: schema.to_string(),
                name: name.to_string(),
            });
            return false;
        }
        if !self.model.contains(package) {
            self.root.push(Violation::UnknownPackage {
                schema: schema.to_string(),
                name: name.to_string(),
                package: package.to_string(),
            });
            return false;
        }
        true
    }

    fn add_packages(&mut self, packages: Vec<declcfg::Package>) {
        for p in packages {
            if p.name.is_empty() {
                self.root.push(Violation::EmptyPackageName);
                continue;
            }
            if self.model.contains(&p.name) {
                self.root.push(Violation::DuplicatePackage { name: p.name });
                continue;
            }
            if let Err(reason) = validate_package_name(&p.name) {
                self.root.push(Violation::InvalidPackageName {
                    name: p.name.clone(),
                    reason,
                });
            }
            self.model.insert(Package {
                name: p.name,
                description: p.description,
                icon: p.icon,
                default_channel: p.default_channel,
                channels: BTreeMap::new(),
                properties: p.properties,
                deprecation: None,
            });
        }
    }

    fn add_channels(&mut self, channels: Vec<declcfg::Channel>) {
        for c in channels {
            if !self.check_package_ref(SCHEMA_CHANNEL, &c.name, &c.package) {
                continue;
            }
            if c.name.is_empty() {
                self.package_node(&c.package).push(Violation::EmptyChannelName);
                continue;
            }
            let Some(pkg) = self.model.get_mut(&c.package) else {
                continue;
            };
            if pkg.channels.contains_key(&c.name) {
                self.package_node(&c.package)
                    .push(Violation::DuplicateChannel { name: c.name });
                continue;
            }
            pkg.channels.insert(
                c.name.clone(),
                Channel {
                    package: c.package.clone(),
                    name: c.name.clone(),
                    bundles: BTreeMap::new(),
                    properties: c.properties,
                    deprecation: None,
                },
            );

            if let Err(violations) = ChannelGraph::build(c.entries.iter().map(GraphEntry::from)) {
                let node = self
                    .package_node(&c.package)
                    .child_mut(Scope::Channel(c.name.clone()));
                for v in violations {
                    node.push(v);
                }
            }

            let stubs = self.record_style.entry(c.package.clone()).or_default();
            let mut seen = BTreeSet::new();
            for entry in c.entries {
                if seen.insert(entry.name.clone()) {
                    stubs
                        .by_bundle
                        .entry(entry.name.clone())
                        .or_default()
                        .push((c.name.clone(), entry));
                }
            }
        }
    }

    fn add_bundle(&mut self, b: declcfg::Bundle) {
        if !self.check_package_ref(SCHEMA_BUNDLE, &b.name, &b.package) {
            return;
        }
        let names = self.bundle_names.entry(b.package.clone()).or_default();
        if !names.insert(b.name.clone()) {
            self.package_node(&b.package)
                .push(Violation::DuplicateBundle { name: b.name });
            return;
        }

        let mut node = ValidationError::new(Scope::Bundle(b.name.clone()));
        if let Some(template) = decode_bundle(&b, &mut node) {
            if self.record_style.contains_key(&b.package) {
                self.attach_to_stubs(&b, template, &mut node);
            } else {
                self.attach_in_bundle(template, &mut node);
            }
        }
        self.package_node(&b.package).push_child(node);
    }

    fn attach_to_stubs(&mut self, b: &declcfg::Bundle, template: BundleTemplate, node: &mut ValidationError) {
        for property_type in template.membership_types() {
            node.push(Violation::ChannelPropertyWithChannelRecords {
                property_type: property_type.to_string(),
            });
        }
        if !node.violations.is_empty() {
            return;
        }

        let stubs = self
            .record_style
            .get_mut(&b.package)
            .and_then(|s| s.by_bundle.remove(&b.name));
        let Some(stubs) = stubs else {
            node.push(Violation::NotInAnyChannel);
            return;
        };
        let Some(pkg) = self.model.get_mut(&b.package) else {
            return;
        };
        for (channel, entry) in stubs {
            let Some(ch) = pkg.channels.get_mut(&channel) else {
                continue;
            };
            let mut bundle = template.bundle.in_channel(&channel);
            bundle.replaces = entry.replaces;
            bundle.skips = entry.skips;
            bundle.skip_range = entry.skip_range;
            ch.bundles.insert(bundle.name.clone(), bundle);
        }
    }

    fn attach_in_bundle(&mut self, template: BundleTemplate, node: &mut ValidationError) {
        let facts = &template.membership;
        if facts.channels.is_empty() {
            node.push(Violation::NotInAnyChannel);
        }
        if facts.skip_ranges.len() > 1 {
            node.push(Violation::MultipleSkipRanges {
                found: facts.skip_ranges.len(),
            });
        }
        if !node.violations.is_empty() {
            return;
        }

        let package = template.bundle.package.clone();
        let skip_range = facts.skip_ranges.first().cloned().unwrap_or_default();
        for fact in &facts.channels {
            if fact.channel_name.is_empty() {
                self.package_node(&package).push(Violation::EmptyChannelName);
                continue;
            }
            let Some(pkg) = self.model.get_mut(&package) else {
                return;
            };
            let ch = pkg
                .channels
                .entry(fact.channel_name.clone())
                .or_insert_with(|| Channel::new(package.clone(), fact.channel_name.clone()));
            if ch.bundles.contains_key(&template.bundle.name) {
                let name = template.bundle.name.clone();
                self.package_node(&package)
                    .child_mut(Scope::Channel(fact.channel_name.clone()))
                    .push(Violation::DuplicateEntry { name });
                continue;
            }
            let mut bundle = template.bundle.in_channel(&fact.channel_name);
            bundle.replaces = fact.replaces.clone();
            bundle.skips = facts.skips.clone();
            bundle.skip_range = skip_range.clone();
            ch.bundles.insert(bundle.name.clone(), bundle);
        }
    }

    fn report_unclaimed_entries(&mut self) {
        let unclaimed: Vec<(String, Vec<String>)> = self
            .record_style
            .iter()
            .filter(|(_, stubs)| !stubs.by_bundle.is_empty())
            .map(|(pkg, stubs)| (pkg.clone(), stubs.by_bundle.keys().cloned().collect()))
            .collect();
        for (pkg, entries) in unclaimed {
            self.package_node(&pkg)
                .push(Violation::EntriesWithoutBundle { entries });
        }
    }

    fn resolve_default_channels(&mut self) {
        for pkg in self.model.packages.values_mut() {
            if pkg.default_channel.is_empty() || pkg.channels.contains_key(&pkg.default_channel) {
                continue;
            }
            let stub = Channel::new(pkg.name.clone(), pkg.default_channel.clone());
            pkg.channels.insert(stub.name.clone(), stub);
        }
    }

    fn apply_deprecations(&mut self, deprecations: Vec<declcfg::Deprecation>) {
        let mut seen = BTreeSet::new();
        for (i, d) in deprecations.into_iter().enumerate() {
            if !self.check_package_ref(SCHEMA_DEPRECATIONS, &format!("[{i}]"), &d.package) {
                continue;
            }
            if !seen.insert(d.package.clone()) {
                self.package_node(&d.package).push(Violation::MultipleDeprecations);
                continue;
            }

            let mut violations = Vec::new();
            let mut references = BTreeSet::new();
            let Some(pkg) = self.model.get_mut(&d.package) else {
                continue;
            };
            for (j, entry) in d.entries.into_iter().enumerate() {
                let reference = entry.reference;
                if reference.schema.is_empty() {
                    violations.push(Violation::DeprecationSchemaUnset { index: j });
                    continue;
                }
                if !references.insert(reference.clone()) {
                    violations.push(Violation::DuplicateDeprecationEntry {
                        schema: reference.schema,
                        name: reference.name,
                    });
                    continue;
                }
                let deprecation = Deprecation::new(entry.message);
                if let Err(v) = deprecate(pkg, &reference.schema, &reference.name, deprecation) {
                    violations.push(v);
                }
            }

            let node = self.package_node(&d.package);
            for v in violations {
                node.push(v);
            }
        }
    }
}

fn deprecate(
    pkg: &mut Package,
    schema: &str,
    name: &str,
    deprecation: Deprecation,
) -> std::result::Result<(), Violation> {
    match schema {
        SCHEMA_BUNDLE => {
            let mut found = false;
            for ch in pkg.channels.values_mut() {
                if let Some(b) = ch.bundles.get_mut(name) {
                    b.deprecation = Some(deprecation.clone());
                    found = true;
                }
            }
            if found {
                Ok(())
            } else {
                Err(Violation::DeprecatedBundleNotFound {
                    name: name.to_string(),
                })
            }
        }
        SCHEMA_CHANNEL => match pkg.channels.get_mut(name) {
            Some(ch) => {
                ch.deprecation = Some(deprecation);
                Ok(())
            }
            None => Err(Violation::DeprecatedChannelNotFound {
                name: name.to_string(),
            }),
        },
        SCHEMA_PACKAGE if name.is_empty() => {
            pkg.deprecation = Some(deprecation);
            Ok(())
        }
        SCHEMA_PACKAGE => Err(Violation::DeprecatedPackageNamed {
            name: name.to_string(),
        }),
        other => Err(Violation::UnknownDeprecationSchema {
            schema: other.to_string(),
            name: name.to_string(),
        }),
    }
}

/// A decoded bundle not yet placed in any channel
struct BundleTemplate {
    bundle: Bundle,
    /// Channel membership facts taken out of the bundle's properties
    membership: Properties,
}

impl BundleTemplate {
    fn membership_types(&self) -> Vec<&'static str> {
        let m = &self.membership;
        let mut types = Vec::new();
        if !m.channels.is_empty() {
            types.push(TYPE_CHANNEL);
        }
        if !m.skips.is_empty() {
            types.push(TYPE_SKIPS);
        }
        if !m.skip_ranges.is_empty() {
            types.push(TYPE_SKIP_RANGE);
        }
        types
    }
}

/// Decode properties and version, recording problems on `node`
fn decode_bundle(b: &declcfg::Bundle, node: &mut ValidationError) -> Option<BundleTemplate> {
    let props = match Properties::parse(&b.properties) {
        Ok(props) => props,
        Err(err) => {
            node.push(Violation::from_property_error(err));
            return None;
        }
    };

    if props.packages.len() != 1 {
        node.push(Violation::PackagePropertyCount {
            found: props.packages.len(),
        });
        return None;
    }
    let package_fact = &props.packages[0];
    if package_fact.package_name != b.package {
        node.push(Violation::PackagePropertyMismatch {
            expected: b.package.clone(),
            found: package_fact.package_name.clone(),
        });
        return None;
    }
    let version = match semver::Version::parse(&package_fact.version) {
        Ok(v) => v,
        Err(e) => {
            node.push(Violation::InvalidVersion {
                version: package_fact.version.clone(),
                reason: e.to_string(),
            });
            return None;
        }
    };

    let mut parsed = props;
    let membership = Properties {
        channels: std::mem::take(&mut parsed.channels),
        skips: std::mem::take(&mut parsed.skips),
        skip_ranges: std::mem::take(&mut parsed.skip_ranges),
        ..Properties::default()
    };
    let properties = b
        .properties
        .iter()
        .filter(|p| !p.is_channel_membership())
        .cloned()
        .collect();

    Some(BundleTemplate {
        bundle: Bundle {
            package: b.package.clone(),
            channel: String::new(),
            name: b.name.clone(),
            image: b.image.clone(),
            version,
            replaces: String::new(),
            skips: Vec::new(),
            skip_range: String::new(),
            properties,
            parsed,
            related_images: b.related_images.clone(),
            csv_json: b.csv_json.clone(),
            objects: b.objects.clone(),
            deprecation: None,
        },
        membership,
    })
}
