//! Structured validation errors
//!
//! A model build never stops at the first problem. Every violated invariant is
//! recorded as a [`Violation`] on the [`ValidationError`] node for the object it
//! concerns, and nodes nest the same way the catalog does:
//!
//! ```text
//! invalid catalog
//! └── invalid package "etcd"
//!     ├── default channel must be set
//!     └── invalid channel "stable"
//!         └── multiple channel heads found in graph: etcd.v1, etcd.v2
//! ```
//!
//! Collection and rendering are separate: tests walk the tree with
//! [`ValidationError::contains`] and [`ValidationError::find`], while the
//! `Display` impl draws it.

use std::fmt;

use thiserror::Error;

/// The object a validation node describes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Catalog,
    Package(String),
    Channel(String),
    Bundle(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Catalog => write!(f, "invalid catalog"),
            Scope::Package(name) => write!(f, "invalid package {name:?}"),
            Scope::Channel(name) => write!(f, "invalid channel {name:?}"),
            Scope::Bundle(name) => write!(f, "invalid bundle {name:?}"),
        }
    }
}

/// A single violated invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    // Catalog level
    #[error("config contains package with no name")]
    EmptyPackageName,

    #[error("duplicate package {name:?}")]
    DuplicatePackage { name: String },

    #[error("invalid package name {name:?}: {reason}")]
    InvalidPackageName { name: String, reason: String },

    #[error("package name must be set for {schema} {name:?}")]
    MissingPackage { schema: String, name: String },

    #[error("unknown package {package:?} for {schema} {name:?}")]
    UnknownPackage {
        schema: String,
        name: String,
        package: String,
    },

    #[error("package key {key:?} does not match package name {name:?}")]
    PackageKeyMismatch { key: String, name: String },

    // Package level
    #[error("package name must not be empty")]
    PackageNameUnset,

    #[error("channel with no name")]
    EmptyChannelName,

    #[error("duplicate channel {name:?}")]
    DuplicateChannel { name: String },

    #[error("duplicate bundle {name:?}")]
    DuplicateBundle { name: String },

    #[error("no olm.bundle blobs found for olm.channel entries: {}", .entries.join(", "))]
    EntriesWithoutBundle { entries: Vec<String> },

    #[error("default channel must be set")]
    DefaultChannelUnset,

    #[error("default channel {name:?} not found in channels list")]
    DefaultChannelNotFound { name: String },

    #[error("package must contain at least one channel")]
    NoChannels,

    #[error("channel key {key:?} does not match channel name {name:?}")]
    ChannelKeyMismatch { key: String, name: String },

    #[error("channel {name:?} not correctly linked to parent package")]
    ChannelNotLinked { name: String },

    #[error("duplicate versions found in bundles: {}", format_versions(.versions))]
    DuplicateVersions { versions: Vec<(String, Vec<String>)> },

    #[error("expected a maximum of one deprecation per package")]
    MultipleDeprecations,

    #[error("schema must be set for deprecation entry [{index}]")]
    DeprecationSchemaUnset { index: usize },

    #[error("duplicate deprecation entry {{schema: {schema:?}, name: {name:?}}}")]
    DuplicateDeprecationEntry { schema: String, name: String },

    #[error("cannot deprecate object {{schema: {schema:?}, name: {name:?}}}: object schema unknown")]
    UnknownDeprecationSchema { schema: String, name: String },

    #[error("package name must be empty for deprecated package (specified {name:?})")]
    DeprecatedPackageNamed { name: String },

    #[error("cannot deprecate channel {name:?}: channel not found")]
    DeprecatedChannelNotFound { name: String },

    #[error("cannot deprecate bundle {name:?}: bundle not found")]
    DeprecatedBundleNotFound { name: String },

    #[error("deprecation message must be set")]
    DeprecationMessageUnset,

    // Channel level
    #[error("channel must contain at least one bundle")]
    EmptyChannel,

    #[error("duplicate entry {name:?}")]
    DuplicateEntry { name: String },

    #[error("entry {name:?} replaces itself")]
    SelfReplace { name: String },

    #[error("entry {name:?} skips itself")]
    SelfSkip { name: String },

    #[error("no channel head found in graph")]
    NoHead,

    #[error("multiple channel heads found in graph: {}", .heads.join(", "))]
    MultipleHeads { heads: Vec<String> },

    #[error("detected cycle in upgrade graph: {}", .nodes.join(", "))]
    Cycle { nodes: Vec<String> },

    #[error("channel contains one or more stranded bundles: {}", .bundles.join(", "))]
    StrandedBundles { bundles: Vec<String> },

    #[error("bundle key {key:?} does not match bundle name {name:?}")]
    BundleKeyMismatch { key: String, name: String },

    #[error("bundle {name:?} not correctly linked to parent channel")]
    BundleNotLinked { name: String },

    // Bundle level
    #[error("name must be set")]
    BundleNameUnset,

    #[error("properties[{index}].value parse error for type {property_type:?}: {reason}")]
    PropertyParse {
        index: usize,
        property_type: String,
        reason: String,
    },

    #[error("must have exactly 1 \"olm.package\" property, found {found}")]
    PackagePropertyCount { found: usize },

    #[error("package {expected:?} does not match \"olm.package\" property {found:?}")]
    PackagePropertyMismatch { expected: String, found: String },

    #[error("error parsing version {version:?}: {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("bundle of a package with olm.channel records must not carry {property_type:?} properties")]
    ChannelPropertyWithChannelRecords { property_type: String },

    #[error("not found in any channel entries")]
    NotInAnyChannel,

    #[error("must have at most 1 \"olm.skipRange\" property, found {found}")]
    MultipleSkipRanges { found: usize },

    #[error("package does not match channel's package")]
    PackageMismatch,

    #[error("skip[{index}] is empty")]
    EmptySkip { index: usize },

    #[error("bundle image must be set")]
    ImageUnset,
}

impl Violation {
    /// Violation form of a property decoding failure
    pub fn from_property_error(err: super::CatalogError) -> Self {
        match err {
            super::CatalogError::PropertyParse {
                index,
                property_type,
                reason,
            } => Violation::PropertyParse {
                index,
                property_type,
                reason,
            },
            other => Violation::PropertyParse {
                index: 0,
                property_type: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

fn format_versions(versions: &[(String, Vec<String>)]) -> String {
    versions
        .iter()
        .map(|(version, names)| format!("{{{version}: [{}]}}", names.join(", ")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A node of the validation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub scope: Scope,
    pub violations: Vec<Violation>,
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            violations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Record a violation on this node; repeats of the same violation are ignored
    pub fn push(&mut self, violation: Violation) {
        if !self.violations.contains(&violation) {
            self.violations.push(violation);
        }
    }

    /// Attach a child node, dropping it if it holds nothing
    pub fn push_child(&mut self, child: ValidationError) {
        if child.is_empty() {
            return;
        }
        if let Some(existing) = self.children.iter_mut().find(|c| c.scope == child.scope) {
            existing.merge(child);
        } else {
            self.children.push(child);
        }
    }

    /// Child node for `scope`, created on first use
    pub fn child_mut(&mut self, scope: Scope) -> &mut ValidationError {
        let idx = match self.children.iter().position(|c| c.scope == scope) {
            Some(idx) => idx,
            None => {
                self.children.push(ValidationError::new(scope));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn merge(&mut self, other: ValidationError) {
        for v in other.violations {
            self.push(v);
        }
        for child in other.children {
            self.push_child(child);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty() && self.children.iter().all(ValidationError::is_empty)
    }

    /// `Ok` when nothing was recorded
    pub fn into_result(mut self) -> std::result::Result<(), ValidationError> {
        self.prune();
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn prune(&mut self) {
        self.children.retain(|c| !c.is_empty());
        for child in &mut self.children {
            child.prune();
        }
    }

    /// Whether `violation` was recorded anywhere in this tree
    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation) || self.children.iter().any(|c| c.contains(violation))
    }

    /// Node reached by following `path` from this node's children
    pub fn find(&self, path: &[Scope]) -> Option<&ValidationError> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children
            .iter()
            .find(|c| &c.scope == first)
            .and_then(|c| c.find(rest))
    }

    /// Every violation in the tree together with the scopes leading to it
    pub fn flatten(&self) -> Vec<(Vec<Scope>, &Violation)> {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);
        out
    }

    fn collect<'a>(&'a self, path: &mut Vec<Scope>, out: &mut Vec<(Vec<Scope>, &'a Violation)>) {
        path.push(self.scope.clone());
        for v in &self.violations {
            out.push((path.clone(), v));
        }
        for child in &self.children {
            child.collect(path, out);
        }
        path.pop();
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let lines: Vec<Line<'_>> = self
            .violations
            .iter()
            .map(Line::Leaf)
            .chain(self.children.iter().map(Line::Node))
            .collect();

        for (i, line) in lines.iter().enumerate() {
            let last = i + 1 == lines.len();
            let (branch, indent) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            match line {
                Line::Leaf(v) => writeln!(f, "{prefix}{branch}{v}")?,
                Line::Node(child) => {
                    writeln!(f, "{prefix}{branch}{}", child.scope)?;
                    child.render(f, &format!("{prefix}{indent}"))?;
                }
            }
        }
        Ok(())
    }
}

enum Line<'a> {
    Leaf(&'a Violation),
    Node(&'a ValidationError),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.scope)?;
        self.render(f, "")
    }
}

impl std::error::Error for ValidationError {}
