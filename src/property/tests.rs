#![allow(clippy::expect_used)]

use serde_json::json;

use super::*;
use crate::error::CatalogError;

#[test]
fn test_parse_groups_known_types() {
    let props = vec![
        Property::package("etcd", "0.9.1"),
        Property::gvk("etcd.database.coreos.com", "v1beta2", "EtcdCluster"),
        Property::gvk_required("monitoring.coreos.com", "v1", "Prometheus"),
        Property::package_required("prometheus", ">=1.0.0"),
        Property::skips("etcd.v0.9.0"),
        Property::skip_range("<0.9.1"),
        Property::channel("alpha", "etcd.v0.9.0"),
        Property::bundle_object("eyJraW5kIjoiQ1NWIn0="),
    ];

    let parsed = Properties::parse(&props).expect("properties should parse");

    assert_eq!(parsed.packages.len(), 1);
    assert_eq!(parsed.packages[0].package_name, "etcd");
    assert_eq!(parsed.packages[0].version, "0.9.1");
    assert_eq!(parsed.gvks[0].kind, "EtcdCluster");
    assert_eq!(parsed.gvks_required[0].group, "monitoring.coreos.com");
    assert_eq!(parsed.packages_required[0].version_range, ">=1.0.0");
    assert_eq!(parsed.skips, vec!["etcd.v0.9.0".to_string()]);
    assert_eq!(parsed.skip_ranges, vec!["<0.9.1".to_string()]);
    assert_eq!(parsed.channels[0].channel_name, "alpha");
    assert_eq!(parsed.channels[0].replaces, "etcd.v0.9.0");
    assert_eq!(parsed.bundle_objects.len(), 1);
    assert!(parsed.others.is_empty());
}

#[test]
fn test_unknown_type_passes_through() {
    let raw = Property::new("example.com/custom", json!({"nested": [1, 2, {"x": null}]}));
    let parsed = Properties::parse(std::slice::from_ref(&raw)).expect("unknown types never fail");
    assert_eq!(parsed.others, vec![raw]);
}

#[test]
fn test_malformed_known_type_reports_index_and_type() {
    let props = vec![
        Property::gvk("g", "v1", "K"),
        Property::new(TYPE_PACKAGE, json!({"packageName": 7})),
    ];
    let err = Properties::parse(&props).expect_err("bad olm.package value must fail");
    match err {
        CatalogError::PropertyParse {
            index,
            property_type,
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(property_type, TYPE_PACKAGE);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_channel_without_replaces() {
    let prop = Property::new(TYPE_CHANNEL, json!({"channelName": "stable"}));
    let fact = Fact::decode(&prop).expect("channel fact should decode");
    assert_eq!(
        fact,
        Fact::Channel(ChannelFact {
            channel_name: "stable".to_string(),
            replaces: String::new(),
        })
    );
    assert_eq!(fact.to_property(), prop);
}

#[test]
fn test_csv_metadata_keeps_unknown_keys() {
    let prop = Property::new(
        TYPE_CSV_METADATA,
        json!({
            "displayName": "etcd",
            "keywords": ["database"],
            "provider": {"name": "CoreOS"},
            "capabilities": "Full Lifecycle"
        }),
    );
    let parsed = Properties::parse(std::slice::from_ref(&prop)).expect("csv metadata should parse");
    let meta = &parsed.csv_metadatas[0];
    assert_eq!(meta.display_name, "etcd");
    assert_eq!(meta.provider.as_ref().map(|p| p.name.as_str()), Some("CoreOS"));
    assert_eq!(meta.extra.get("capabilities"), Some(&json!("Full Lifecycle")));
}

#[test]
fn test_search_metadata() {
    let prop = Property::new(
        TYPE_SEARCH_METADATA,
        json!([{"name": "category", "type": "string", "value": "Database"}]),
    );
    let parsed = Properties::parse(std::slice::from_ref(&prop)).expect("search metadata should parse");
    assert_eq!(parsed.search_metadatas[0][0].name, "category");
}

#[test]
fn test_membership_detection() {
    assert!(Property::skips("a").is_channel_membership());
    assert!(Property::skip_range("<1.0.0").is_channel_membership());
    assert!(Property::channel("a", "").is_channel_membership());
    assert!(!Property::package("a", "1.0.0").is_channel_membership());
}
