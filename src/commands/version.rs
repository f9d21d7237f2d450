//! Version command: crate version plus the catalog formats this build reads

use std::fmt::Write as _;

use opcat::declcfg::{SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_DEPRECATIONS, SCHEMA_PACKAGE};
use opcat::error::Result;
use opcat::property::{
    TYPE_BUNDLE_OBJECT, TYPE_CHANNEL, TYPE_CSV_METADATA, TYPE_GVK, TYPE_GVK_REQUIRED,
    TYPE_PACKAGE, TYPE_PACKAGE_REQUIRED, TYPE_SEARCH_METADATA, TYPE_SKIP_RANGE, TYPE_SKIPS,
};

const SCHEMAS: [&str; 4] = [SCHEMA_PACKAGE, SCHEMA_CHANNEL, SCHEMA_BUNDLE, SCHEMA_DEPRECATIONS];

const PROPERTY_TYPES: [&str; 10] = [
    TYPE_PACKAGE,
    TYPE_PACKAGE_REQUIRED,
    TYPE_GVK,
    TYPE_GVK_REQUIRED,
    TYPE_BUNDLE_OBJECT,
    TYPE_CHANNEL,
    TYPE_SKIPS,
    TYPE_SKIP_RANGE,
    TYPE_CSV_METADATA,
    TYPE_SEARCH_METADATA,
];

const INPUT_FORMATS: [&str; 2] = ["JSON stream", "YAML multi-document"];

fn report() -> String {
    let mut out = format!("opcat {}\n\n", env!("CARGO_PKG_VERSION"));
    let sections = [
        ("Catalog schemas", SCHEMAS.as_slice()),
        ("Property types", PROPERTY_TYPES.as_slice()),
        ("Input formats", INPUT_FORMATS.as_slice()),
    ];
    for (title, items) in sections {
        let _ = writeln!(out, "{title}:");
        for item in items {
            let _ = writeln!(out, "  {item}");
        }
    }
    out
}

/// Run version command
pub fn run() -> Result<()> {
    print!("{}", report());
    Ok(())
}
