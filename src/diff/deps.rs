//! Dependency closure of a diff
//!
//! Bundles in the output may require GVKs or package versions. Each
//! requirement the output does not already satisfy is resolved against the new
//! catalog: the best providing bundle of every candidate package is added,
//! together with its upgrade path to the channel head, unless the consumer's
//! prior catalog already has it. Added bundles can bring requirements of
//! their own, so this repeats until nothing new turns up.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tracing::debug;

use super::intersect::intersect;
use crate::error::Result;
use crate::error::diff::{config, unreachable_head};
use crate::model::{Bundle, Channel, Model, Package};
use crate::property::{Gvk, PackageRequired};
use crate::version::VersionRange;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Requirement {
    Gvk(Gvk),
    Package(PackageRequired),
}

/// A requirement in resolvable form
enum Matcher<'a> {
    Gvk(&'a Gvk),
    Package { name: &'a str, range: VersionRange },
}

impl Matcher<'_> {
    fn matches(&self, bundle: &Bundle) -> bool {
        match self {
            Matcher::Gvk(gvk) => bundle.parsed.gvks.contains(*gvk),
            Matcher::Package { name, range } => {
                bundle.package == *name && range.matches(&bundle.version)
            }
        }
    }
}

/// Add to `out` whatever its bundles require from `new`
///
/// # Errors
///
/// Returns `CatalogError::InvalidRange` for an unparsable required range and
/// `CatalogError::UnreachableHead` when a provider cannot be joined to its
/// channel head.
pub fn add_dependencies(old: &Model, new: &Model, out: &mut Model) -> Result<()> {
    let mut handled: BTreeSet<Requirement> = BTreeSet::new();

    loop {
        let pending: Vec<Requirement> = requirements(out)
            .into_iter()
            .filter(|r| !handled.contains(r))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        for requirement in pending {
            resolve(&requirement, old, new, out)?;
            handled.insert(requirement);
        }
    }
}

fn requirements(model: &Model) -> BTreeSet<Requirement> {
    let mut found = BTreeSet::new();
    for b in model.bundles() {
        found.extend(b.parsed.gvks_required.iter().cloned().map(Requirement::Gvk));
        found.extend(
            b.parsed
                .packages_required
                .iter()
                .cloned()
                .map(Requirement::Package),
        );
    }
    found
}

fn resolve(requirement: &Requirement, old: &Model, new: &Model, out: &mut Model) -> Result<()> {
    let matcher = match requirement {
        Requirement::Gvk(gvk) => Matcher::Gvk(gvk),
        Requirement::Package(req) => Matcher::Package {
            name: &req.package_name,
            range: VersionRange::parse(&req.version_range)?,
        },
    };

    if out.bundles().any(|b| matcher.matches(b)) {
        return Ok(());
    }

    for pkg in new.packages.values() {
        let Some((ch, provider)) = best_provider(pkg, &matcher) else {
            continue;
        };
        if old.get(&pkg.name).and_then(|p| p.find_bundle(&provider.name)).is_some() {
            debug!(
                package = %pkg.name,
                bundle = %provider.name,
                "dependency already present in prior catalog"
            );
            continue;
        }
        debug!(
            package = %pkg.name,
            channel = %ch.name,
            bundle = %provider.name,
            ?requirement,
            "adding dependency"
        );
        add_with_upgrade_path(out, pkg, ch, provider)?;
    }
    Ok(())
}

/// The providing bundle to add from `pkg`, if any
///
/// Bundles of the default channel win, then higher versions, then channel
/// names earlier in sort order.
fn best_provider<'a>(pkg: &'a Package, matcher: &Matcher<'_>) -> Option<(&'a Channel, &'a Bundle)> {
    pkg.channels
        .values()
        .flat_map(|ch| ch.bundles.values().map(move |b| (ch, b)))
        .filter(|(_, b)| matcher.matches(b))
        .max_by_key(|&(ch, b)| {
            (
                ch.name == pkg.default_channel,
                b.version.clone(),
                Reverse(ch.name.clone()),
            )
        })
}

fn add_with_upgrade_path(out: &mut Model, pkg: &Package, ch: &Channel, bundle: &Bundle) -> Result<()> {
    let head = ch
        .head()
        .map_err(|v| config(format!("channel {:?}: {v}", ch.name)))?;
    let (path, found) = intersect(ch, bundle, head);
    if !found {
        return Err(unreachable_head(&ch.name, &head.name, &bundle.name));
    }

    let target = out.ensure_channel(pkg, ch);
    for b in ch.bundles.values().filter(|b| path.contains(&b.name)) {
        target
            .bundles
            .entry(b.name.clone())
            .or_insert_with(|| b.clone());
    }
    Ok(())
}
