#![allow(clippy::expect_used)]

use semver::Version;

use super::*;
use crate::declcfg::RelatedImage;
use crate::error::{Scope, Violation};
use crate::property::Property;
use crate::test_fixtures::{linear_package, model_of};

fn member(channel: &str, name: &str, version: &str, replaces: &str) -> Bundle {
    let mut b = Bundle::new(
        "etcd",
        channel,
        name,
        Version::parse(version).expect("valid version"),
    );
    b.image = format!("registry.example.com/etcd:{version}");
    b.replaces = replaces.to_string();
    b
}

fn channel_of(name: &str, bundles: Vec<Bundle>) -> Channel {
    let mut ch = Channel::new("etcd", name);
    for b in bundles {
        ch.bundles.insert(b.name.clone(), b);
    }
    ch
}

fn model_with(channels: Vec<Channel>) -> Model {
    let mut pkg = Package::new("etcd");
    pkg.default_channel = "stable".to_string();
    for ch in channels {
        pkg.channels.insert(ch.name.clone(), ch);
    }
    let mut model = Model::new();
    model.insert(pkg);
    model
}

fn stable() -> Channel {
    channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1"),
        ],
    )
}

fn etcd_path(rest: &[Scope]) -> Vec<Scope> {
    let mut path = vec![Scope::Package("etcd".to_string())];
    path.extend_from_slice(rest);
    path
}

#[test]
fn test_valid_model() {
    assert!(model_with(vec![stable()]).validate().is_ok());
}

#[test]
fn test_head_of_linear_channel() {
    let ch = stable();
    assert_eq!(ch.head().expect("single head").name, "etcd.v2");
}

#[test]
fn test_head_ignores_skipped_bundles() {
    let mut v3 = member("stable", "etcd.v3", "3.0.0", "etcd.v2");
    v3.skips = vec!["etcd.v1b".to_string()];
    let ch = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v1b", "1.1.0", ""),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1"),
            v3,
        ],
    );
    assert_eq!(ch.head().expect("single head").name, "etcd.v3");
}

#[test]
fn test_head_errors() {
    let forked = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v2", "2.0.0", ""),
        ],
    );
    assert_eq!(
        forked.head().expect_err("two heads"),
        Violation::MultipleHeads {
            heads: vec!["etcd.v1".to_string(), "etcd.v2".to_string()]
        }
    );

    let looped = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", "etcd.v2"),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1"),
        ],
    );
    assert_eq!(looped.head().expect_err("no head"), Violation::NoHead);

    assert_eq!(
        Channel::new("etcd", "empty").head().expect_err("no bundles"),
        Violation::NoHead
    );
}

#[test]
fn test_validate_package_level() {
    let mut model = model_with(vec![stable()]);
    model
        .get_mut("etcd")
        .expect("package present")
        .default_channel = "fast".to_string();
    let err = model.validate().expect_err("default channel missing");
    let node = err.find(&etcd_path(&[])).expect("package node");
    assert!(node.contains(&Violation::DefaultChannelNotFound {
        name: "fast".to_string()
    }));

    let mut unset = model_with(Vec::new());
    unset.get_mut("etcd").expect("package present").default_channel = String::new();
    let err = unset.validate().expect_err("no channels");
    assert!(err.contains(&Violation::DefaultChannelUnset));
    assert!(err.contains(&Violation::NoChannels));
}

#[test]
fn test_validate_empty_channel() {
    let model = model_with(vec![stable(), Channel::new("etcd", "fast")]);
    let err = model.validate().expect_err("empty channel");
    let node = err
        .find(&etcd_path(&[Scope::Channel("fast".to_string())]))
        .expect("channel node");
    assert!(node.contains(&Violation::EmptyChannel));
    assert!(err.find(&etcd_path(&[Scope::Channel("stable".to_string())])).is_none());
}

#[test]
fn test_validate_stranded_bundles() {
    let mut head = member("stable", "etcd.v3", "3.0.0", "etcd.v1");
    head.skips = vec!["etcd.v2".to_string()];
    let ch = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v1.5", "1.5.0", ""),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1.5"),
            head,
        ],
    );
    assert_eq!(ch.head().expect("single head").name, "etcd.v3");

    let err = model_with(vec![ch]).validate().expect_err("etcd.v1.5 is stranded");
    let node = err
        .find(&etcd_path(&[Scope::Channel("stable".to_string())]))
        .expect("channel node");
    assert!(node.contains(&Violation::StrandedBundles {
        bundles: vec!["etcd.v1.5".to_string()]
    }));
    assert!(err.to_string().contains("channel contains one or more stranded bundles: etcd.v1.5"));
}

#[test]
fn test_skipped_side_branch_is_not_stranded() {
    let mut head = member("stable", "etcd.v3", "3.0.0", "etcd.v1");
    head.skips = vec!["etcd.v2".to_string(), "etcd.v1.5".to_string()];
    let ch = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v1.5", "1.5.0", ""),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1.5"),
            head,
        ],
    );
    assert!(model_with(vec![ch]).validate().is_ok());
}

#[test]
fn test_head_reports_cycle_behind_head() {
    let ch = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", "etcd.v2"),
            member("stable", "etcd.v2", "2.0.0", "etcd.v1"),
            member("stable", "etcd.v3", "3.0.0", "etcd.v2"),
        ],
    );
    assert!(matches!(
        ch.head().expect_err("cycle"),
        Violation::Cycle { .. }
    ));
}

#[test]
fn test_validate_links() {
    let mut ch = stable();
    ch.package = "other".to_string();
    let stray = member("fast", "etcd.v3", "3.0.0", "etcd.v2");
    ch.bundles.insert(stray.name.clone(), stray);
    let model = model_with(vec![ch]);

    let err = model.validate().expect_err("broken links");
    assert!(err.contains(&Violation::ChannelNotLinked {
        name: "stable".to_string()
    }));
    assert!(err.contains(&Violation::BundleNotLinked {
        name: "etcd.v3".to_string()
    }));
    let bundle_node = err
        .find(&etcd_path(&[
            Scope::Channel("stable".to_string()),
            Scope::Bundle("etcd.v1".to_string()),
        ]))
        .expect("bundle node");
    assert!(bundle_node.contains(&Violation::PackageMismatch));
}

#[test]
fn test_validate_key_mismatch() {
    let mut model = model_with(vec![stable()]);
    let pkg = model.get_mut("etcd").expect("package present");
    let ch = pkg.channels.get_mut("stable").expect("channel present");
    let b = ch.bundles.remove("etcd.v1").expect("bundle present");
    ch.bundles.insert("etcd.v1-old".to_string(), b);

    let err = model.validate().expect_err("key mismatch");
    assert!(err.contains(&Violation::BundleKeyMismatch {
        key: "etcd.v1-old".to_string(),
        name: "etcd.v1".to_string()
    }));
}

#[test]
fn test_validate_bundle_fields() {
    let mut v1 = member("stable", "etcd.v1", "1.0.0", "");
    v1.image = String::new();
    let mut v2 = member("stable", "etcd.v2", "2.0.0", "etcd.v1");
    v2.skips = vec![String::new()];
    v2.properties.push(Property::package("etcd", "2.0.0"));
    let model = model_with(vec![channel_of("stable", vec![v1, v2])]);

    let err = model.validate().expect_err("bundle problems");
    assert!(err.contains(&Violation::ImageUnset));
    assert!(err.contains(&Violation::EmptySkip { index: 0 }));
    assert!(err.contains(&Violation::PackagePropertyCount { found: 2 }));
}

#[test]
fn test_validate_bundle_objects_replace_image() {
    let mut v1 = member("stable", "etcd.v1", "1.0.0", "");
    v1.image = String::new();
    v1.objects = vec!["{}".to_string()];
    let model = model_with(vec![channel_of("stable", vec![v1])]);
    assert!(model.validate().is_ok());
}

#[test]
fn test_validate_duplicate_versions() {
    let ch = channel_of(
        "stable",
        vec![
            member("stable", "etcd.v1", "1.0.0", ""),
            member("stable", "etcd.v1-rebuild", "1.0.0", "etcd.v1"),
        ],
    );
    let err = model_with(vec![ch]).validate().expect_err("duplicate versions");
    assert!(err.contains(&Violation::DuplicateVersions {
        versions: vec![(
            "1.0.0".to_string(),
            vec!["etcd.v1".to_string(), "etcd.v1-rebuild".to_string()]
        )]
    }));
}

#[test]
fn test_same_bundle_in_two_channels_is_not_a_duplicate_version() {
    let fast = channel_of("fast", vec![member("fast", "etcd.v2", "2.0.0", "")]);
    assert!(model_with(vec![stable(), fast]).validate().is_ok());
}

#[test]
fn test_validate_empty_deprecation_message() {
    let mut ch = stable();
    ch.deprecation = Some(Deprecation::new(""));
    let err = model_with(vec![ch]).validate().expect_err("empty message");
    assert!(err.contains(&Violation::DeprecationMessageUnset));
}

#[test]
fn test_add_bundle_copies_metadata_once() {
    let source = model_of(linear_package("etcd", "stable", &["1.0.0", "2.0.0"]));
    let pkg = source.get("etcd").expect("package present");
    let ch = pkg.channels.get("stable").expect("channel present");

    let mut out = Model::new();
    for b in ch.bundles.values() {
        out.add_bundle(pkg, ch, b);
    }

    let copied = out.get("etcd").expect("package copied");
    assert_eq!(copied.default_channel, "stable");
    assert_eq!(copied.channels.len(), 1);
    assert_eq!(out.bundles().count(), 2);
    assert_eq!(out, source);
}

#[test]
fn test_ensure_channel_keeps_existing_bundles() {
    let source = model_of(linear_package("etcd", "stable", &["1.0.0", "2.0.0"]));
    let pkg = source.get("etcd").expect("package present");
    let ch = pkg.channels.get("stable").expect("channel present");
    let head = ch.head().expect("head");

    let mut out = Model::new();
    out.add_bundle(pkg, ch, head);
    let target = out.ensure_channel(pkg, ch);
    assert_eq!(target.bundles.len(), 1);
    assert!(target.bundles.contains_key("etcd.v2.0.0"));
}

#[test]
fn test_prune_empty() {
    let mut model = model_with(vec![stable(), Channel::new("etcd", "fast")]);
    let mut empty = Package::new("ghost");
    empty
        .channels
        .insert("stable".to_string(), Channel::new("ghost", "stable"));
    model.insert(empty);

    model.prune_empty();
    assert!(!model.contains("ghost"));
    let etcd = model.get("etcd").expect("package kept");
    assert_eq!(etcd.channels.keys().collect::<Vec<_>>(), vec!["stable"]);
}

#[test]
fn test_find_bundle_across_channels() {
    let fast = channel_of("fast", vec![member("fast", "etcd.v3", "3.0.0", "")]);
    let model = model_with(vec![stable(), fast]);
    let pkg = model.get("etcd").expect("package present");
    assert_eq!(pkg.find_bundle("etcd.v3").map(|b| b.channel.as_str()), Some("fast"));
    assert_eq!(pkg.find_bundle("etcd.v2").map(|b| b.channel.as_str()), Some("stable"));
    assert!(pkg.find_bundle("etcd.v9").is_none());
}

#[test]
fn test_in_channel_rehomes_copy() {
    let b = member("stable", "etcd.v1", "1.0.0", "");
    let moved = b.in_channel("fast");
    assert_eq!(moved.channel, "fast");
    assert_eq!(moved.name, b.name);
    assert_eq!(b.channel, "stable");
}

#[test]
fn test_normalize_sorts_bundle_fields() {
    let mut v1 = member("stable", "etcd.v1", "1.0.0", "");
    v1.properties.insert(0, Property::gvk("etcd.database.coreos.com", "v1", "EtcdCluster"));
    v1.skips = vec!["etcd.v0b".to_string(), "etcd.v0a".to_string()];
    v1.related_images = vec![
        RelatedImage {
            name: "z".to_string(),
            image: "registry.example.com/z".to_string(),
        },
        RelatedImage {
            name: "a".to_string(),
            image: "registry.example.com/a".to_string(),
        },
    ];
    let mut model = model_with(vec![channel_of("stable", vec![v1])]);

    model.normalize();
    let b = model.bundles().next().expect("bundle present");
    let types: Vec<&str> = b.properties.iter().map(|p| p.property_type.as_str()).collect();
    assert_eq!(types, vec!["olm.gvk", "olm.package"]);
    assert_eq!(b.skips, vec!["etcd.v0a", "etcd.v0b"]);
    assert_eq!(b.related_images[0].name, "a");
    assert_eq!(b.parsed.gvks.len(), 1);
}
