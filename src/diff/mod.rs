//! Catalog diffs
//!
//! [`DiffGenerator::run`] builds a new [`Model`] holding only what a consumer
//! of the old catalog needs from the new one. Neither input is modified.
//!
//! ## Selection
//!
//! | Includer | Additive | Result                                           |
//! |----------|----------|--------------------------------------------------|
//! | empty    | no       | heads-only or latest                             |
//! | set      | no       | includer output only                             |
//! | set      | yes      | heads-only or latest, merged with includer output |
//!
//! Heads-only copies each channel's head. Latest copies the new catalog and
//! drops every bundle whose content equals the same bundle in the same
//! channel of the old catalog.
//!
//! Afterwards the dependency closure runs (unless skipped) and every output
//! package gets its default channel, at least with its head.

pub mod deps;
pub mod include;
pub mod intersect;

pub use include::{DiffIncludeChannel, DiffIncludePackage, DiffIncluder};
pub use intersect::intersect;

use tracing::debug;

use crate::error::Result;
use crate::error::diff::config;
use crate::hash::bundles_equal;
use crate::model::Model;

/// Options of a diff run
#[derive(Debug, Clone, Default)]
pub struct DiffGenerator {
    pub skip_dependencies: bool,
    pub heads_only: bool,
    pub include_additively: bool,
    pub includer: DiffIncluder,
}

impl DiffGenerator {
    /// Compute the diff from `old` to `new`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DiffConfig` for contradictory options,
    /// `CatalogError::Include` when included content is missing from `new`,
    /// and the errors of [`deps::add_dependencies`].
    pub fn run(&self, old: &Model, new: &Model) -> Result<Model> {
        if self.include_additively && self.includer.is_empty() {
            return Err(config(
                "include_additively requires at least one include directive",
            ));
        }

        let mut out = if !self.includer.is_empty() && !self.include_additively {
            self.includer.run(new)?
        } else {
            let mut out = if self.heads_only {
                heads_only(new)?
            } else {
                latest(old, new)
            };
            if self.include_additively {
                merge(&mut out, self.includer.run(new)?);
            }
            out
        };

        if !self.skip_dependencies {
            deps::add_dependencies(old, new, &mut out)?;
        }
        ensure_default_channels(new, &mut out)?;
        out.normalize();

        debug!(
            packages = out.len(),
            bundles = out.bundles().count(),
            heads_only = self.heads_only,
            "computed catalog diff"
        );
        Ok(out)
    }
}

/// Each channel of `new` reduced to its head
fn heads_only(new: &Model) -> Result<Model> {
    let mut out = Model::new();
    for pkg in new.packages.values() {
        for ch in pkg.channels.values() {
            let head = ch
                .head()
                .map_err(|v| config(format!("package {:?} channel {:?}: {v}", pkg.name, ch.name)))?;
            out.add_bundle(pkg, ch, head);
        }
    }
    Ok(out)
}

/// `new` without the bundles `old` already has unchanged
fn latest(old: &Model, new: &Model) -> Model {
    let mut out = Model::new();
    for pkg in new.packages.values() {
        for ch in pkg.channels.values() {
            let old_ch = old.channel(&pkg.name, &ch.name);
            for b in ch.bundles.values() {
                let unchanged = old_ch
                    .and_then(|c| c.bundles.get(&b.name))
                    .is_some_and(|prior| bundles_equal(prior, b));
                if !unchanged {
                    out.add_bundle(pkg, ch, b);
                }
            }
        }
    }
    out.prune_empty();
    out
}

/// Add every bundle of `other` that `out` lacks
fn merge(out: &mut Model, other: Model) {
    for pkg in other.packages.values() {
        for ch in pkg.channels.values() {
            let target = out.ensure_channel(pkg, ch);
            for b in ch.bundles.values() {
                target
                    .bundles
                    .entry(b.name.clone())
                    .or_insert_with(|| b.clone());
            }
        }
    }
}

/// Give every output package its default channel from `new`
fn ensure_default_channels(new: &Model, out: &mut Model) -> Result<()> {
    let names: Vec<String> = out.packages.keys().cloned().collect();
    for name in names {
        let Some(pkg) = new.get(&name) else {
            continue;
        };
        let Some(default) = pkg.default_channel() else {
            continue;
        };
        if out.channel(&name, &default.name).is_some() {
            continue;
        }
        let head = default.head().map_err(|v| {
            config(format!("package {name:?} default channel {:?}: {v}", default.name))
        })?;
        out.add_bundle(pkg, default, head);
    }
    Ok(())
}
