//! BLAKE3 content hashing for bundle equality
//!
//! A bundle's structural hash covers every field except the channel it sits
//! in and its denormalized manifest copies (`csv_json`, `objects`). Those two
//! are compared by value in [`bundles_equal`] instead of being fed through the
//! hasher on every comparison.

use blake3::Hasher;

use crate::model::Bundle;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Feed one length-prefixed field into the hasher
fn update_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn update_list<'a, I>(hasher: &mut Hasher, items: I)
where
    I: ExactSizeIterator<Item = &'a [u8]>,
{
    hasher.update(&(items.len() as u64).to_le_bytes());
    for item in items {
        update_field(hasher, item);
    }
}

/// Structural hash of a bundle
///
/// Properties count as a multiset: their order does not change the hash.
pub fn bundle_hash(bundle: &Bundle) -> String {
    let mut hasher = Hasher::new();

    for field in [
        &bundle.package,
        &bundle.name,
        &bundle.image,
        &bundle.version.to_string(),
        &bundle.replaces,
        &bundle.skip_range,
    ] {
        update_field(&mut hasher, field.as_bytes());
    }

    let mut skips: Vec<&str> = bundle.skips.iter().map(String::as_str).collect();
    skips.sort_unstable();
    update_list(&mut hasher, skips.iter().map(|s| s.as_bytes()));

    // serde_json keeps object keys sorted, so equal values encode equally
    let mut properties: Vec<String> = bundle
        .properties
        .iter()
        .map(|p| format!("{}\0{}", p.property_type, p.value))
        .collect();
    properties.sort_unstable();
    update_list(&mut hasher, properties.iter().map(String::as_bytes));

    let mut related: Vec<String> = bundle
        .related_images
        .iter()
        .map(|r| format!("{}\0{}", r.name, r.image))
        .collect();
    related.sort_unstable();
    update_list(&mut hasher, related.iter().map(String::as_bytes));

    match &bundle.deprecation {
        Some(d) => {
            hasher.update(&[1]);
            update_field(&mut hasher, d.message.as_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Whether two bundles carry the same content
pub fn bundles_equal(a: &Bundle, b: &Bundle) -> bool {
    bundle_hash(a) == bundle_hash(b) && a.csv_json == b.csv_json && a.objects == b.objects
}
