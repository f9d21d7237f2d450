//! Deterministic ordering for comparison and output

use super::Model;
use crate::property::{Properties, Property};

fn property_key(p: &Property) -> (String, String) {
    (p.property_type.clone(), p.value.to_string())
}

impl Model {
    /// Sort bundle properties, skips and related images
    ///
    /// Packages, channels and bundles are already kept in name order by
    /// their maps. Parsed facts are regrouped from the sorted properties.
    pub fn normalize(&mut self) {
        for pkg in self.packages.values_mut() {
            for ch in pkg.channels.values_mut() {
                for b in ch.bundles.values_mut() {
                    b.properties.sort_by_cached_key(property_key);
                    if let Ok(parsed) = Properties::parse(&b.properties) {
                        b.parsed = parsed;
                    }
                    b.skips.sort();
                    b.related_images.sort();
                }
            }
        }
    }
}
