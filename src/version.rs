//! Semantic version ranges
//!
//! Required-package facts, skip ranges and include directives all express
//! version constraints in the same small language:
//!
//! ```text
//! >=1.0.0 <2.0.0 || 3.0.0
//! ^^^^^^^^^^^^^^    ^^^^^
//! AND (whitespace)  OR (||)
//! ```
//!
//! Comparators are `=`, `==`, `!=`, `>`, `>=`, `<`, `<=`, or a bare version
//! meaning `=`. Partial versions are padded with zeros (`1.2` is `1.2.0`).
//! Matching uses semver precedence, so pre-releases compare like any other
//! version and build metadata is ignored.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

use crate::error::property::{invalid_range, invalid_version};
use crate::error::Result;

/// Parse a full semantic version
pub fn parse_version(input: &str) -> Result<Version> {
    Version::parse(input.trim()).map_err(|e| invalid_version(input, e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn matches(&self, v: &Version) -> bool {
        let ord = v.cmp_precedence(&self.version);
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Ne => ord != Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Ge => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Le => ord != Ordering::Greater,
        }
    }
}

/// A disjunction of comparator conjunctions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl VersionRange {
    /// Parse a range expression
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidRange` when the input is empty, has an
    /// empty `||` alternative, or contains a malformed comparator.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid_range(input, "range is empty"));
        }

        let mut alternatives = Vec::new();
        for part in trimmed.split("||") {
            let comparators = parse_conjunction(part).map_err(|reason| invalid_range(input, reason))?;
            if comparators.is_empty() {
                return Err(invalid_range(input, "empty alternative around '||'"));
            }
            alternatives.push(comparators);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            alternatives,
        })
    }

    /// Whether `version` satisfies any alternative of this range
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|all| all.iter().all(|c| c.matches(version)))
    }

    /// The expression as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> = self
            .alternatives
            .iter()
            .map(|all| {
                all.iter()
                    .map(|c| format!("{}{}", c.op.symbol(), c.version))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        f.write_str(&alternatives.join(" || "))
    }
}

impl std::str::FromStr for VersionRange {
    type Err = crate::error::CatalogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_conjunction(part: &str) -> std::result::Result<Vec<Comparator>, String> {
    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in part.split_whitespace() {
        let (op_str, rest) = split_operator(token);
        match (pending_op.take(), op_str, rest.is_empty()) {
            // operator written apart from its version, e.g. ">= 1.0.0"
            (None, Some(op), true) => pending_op = Some(op),
            (Some(op), None, false) => comparators.push(comparator(op, rest)?),
            (None, op, false) => comparators.push(comparator(op.unwrap_or("="), rest)?),
            (Some(op), _, _) => return Err(format!("operator '{op}' is not followed by a version")),
            (None, None, true) => {}
        }
    }

    if let Some(op) = pending_op {
        return Err(format!("operator '{op}' is not followed by a version"));
    }
    Ok(comparators)
}

fn split_operator(token: &str) -> (Option<&str>, &str) {
    for op in [">=", "<=", "==", "!=", ">", "<", "="] {
        if let Some(rest) = token.strip_prefix(op) {
            return (Some(op), rest);
        }
    }
    (None, token)
}

fn comparator(op: &str, version: &str) -> std::result::Result<Comparator, String> {
    let op = match op {
        "=" | "==" => Op::Eq,
        "!=" => Op::Ne,
        ">" => Op::Gt,
        ">=" => Op::Ge,
        "<" => Op::Lt,
        "<=" => Op::Le,
        other => return Err(format!("unknown operator '{other}'")),
    };
    let version = pad_version(version.trim_start_matches('v'));
    let version = Version::parse(&version).map_err(|e| format!("version '{version}': {e}"))?;
    Ok(Comparator { op, version })
}

/// Pad `1` and `1.2` to full `major.minor.patch` form
fn pad_version(input: &str) -> String {
    let split_at = input.find(['-', '+']).unwrap_or(input.len());
    let (core, suffix) = input.split_at(split_at);
    let dots = core.matches('.').count();
    match dots {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => input.to_string(),
    }
}
