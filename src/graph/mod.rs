//! Channel upgrade graph construction
//!
//! A channel is a set of entries linked by `replaces` and `skips` edges. Each
//! edge points from the newer entry to the older one it supersedes, so the
//! channel head is the single declared entry nothing points at.
//!
//! ## Algorithm
//!
//! 1. Count incoming edges per target. A target with no entry of its own gets
//!    a placeholder node: replacing an older bundle that is not in this
//!    channel is legal.
//! 2. Heads are declared entries with zero incoming edges. There must be
//!    exactly one.
//! 3. Starting from the heads, walk the graph Kahn-style: visiting a node
//!    decrements the counter of every target it points at, and a target is
//!    queued once its counter reaches zero. Anything still holding incoming
//!    edges afterwards sits on, or behind, a cycle.
//!
//! Every problem found is returned together so one pass reports all of them.
//!
//! A graph that builds can still strand entries: an entry that is neither on
//! the head's `replaces` chain nor skipped by anything is never offered as an
//! upgrade. [`ChannelGraph::stranded`] lists those.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::declcfg::ChannelEntry;
use crate::error::Violation;

/// One entry as seen by the graph builder
#[derive(Debug, Clone, Copy)]
pub struct GraphEntry<'a> {
    pub name: &'a str,
    pub replaces: &'a str,
    pub skips: &'a [String],
}

impl<'a> From<&'a ChannelEntry> for GraphEntry<'a> {
    fn from(entry: &'a ChannelEntry) -> Self {
        GraphEntry {
            name: &entry.name,
            replaces: &entry.replaces,
            skips: &entry.skips,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    /// False for placeholders created for dangling targets
    declared: bool,
    replaces: Option<String>,
    skips: Vec<String>,
    /// Entries whose `replaces` points here
    replaced_by: Vec<String>,
}

impl Node {
    fn targets(&self) -> impl Iterator<Item = &str> {
        self.replaces
            .iter()
            .map(String::as_str)
            .chain(self.skips.iter().map(String::as_str))
    }
}

/// A validated channel graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGraph {
    head: String,
    nodes: BTreeMap<String, Node>,
}

impl ChannelGraph {
    /// Build and validate the graph of one channel
    ///
    /// # Errors
    ///
    /// Returns every violation found: duplicate entries, self references,
    /// missing or ambiguous heads and cycles.
    pub fn build<'a, I>(entries: I) -> std::result::Result<Self, Vec<Violation>>
    where
        I: IntoIterator<Item = GraphEntry<'a>>,
    {
        let mut errors = Vec::new();
        let mut nodes = declare_nodes(entries, &mut errors);
        link_targets(&mut nodes);

        let mut incoming = incoming_counts(&nodes);
        let heads: Vec<String> = nodes
            .iter()
            .filter(|(name, node)| node.declared && incoming.get(name.as_str()).copied() == Some(0))
            .map(|(name, _)| name.clone())
            .collect();

        match heads.len() {
            0 => errors.push(Violation::NoHead),
            1 => {}
            _ => errors.push(Violation::MultipleHeads {
                heads: heads.clone(),
            }),
        }

        if !heads.is_empty() {
            let stuck = drain_from(&heads, &nodes, &mut incoming);
            if !stuck.is_empty() {
                errors.push(Violation::Cycle { nodes: stuck });
            }
        }

        match heads.into_iter().next() {
            Some(head) if errors.is_empty() => Ok(Self { head, nodes }),
            _ => Err(errors),
        }
    }

    /// Name of the channel head
    pub fn head(&self) -> &str {
        &self.head
    }

    /// Whether `name` is a declared entry (not a placeholder)
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.get(name).is_some_and(|n| n.declared)
    }

    pub fn replaces_of(&self, name: &str) -> Option<&str> {
        self.nodes.get(name).and_then(|n| n.replaces.as_deref())
    }

    /// Entries that directly replace `name`
    pub fn replaced_by(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map_or(&[], |n| n.replaced_by.as_slice())
    }

    /// Declared entry names in sorted order
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.declared)
            .map(|(name, _)| name.as_str())
    }

    /// `from` followed by every `replaces` target reachable from it
    ///
    /// A placeholder ends the chain but is still listed.
    pub fn replaces_chain<'a>(&'a self, from: &'a str) -> Vec<&'a str> {
        let mut chain = vec![from];
        while let Some(next) = chain.last().and_then(|name| self.replaces_of(name)) {
            chain.push(next);
        }
        chain
    }

    /// Declared entries off the head's replaces chain that nothing skips, sorted
    pub fn stranded(&self) -> Vec<String> {
        let on_chain: BTreeSet<&str> = self.replaces_chain(&self.head).into_iter().collect();
        let skipped: BTreeSet<&str> = self
            .nodes
            .values()
            .flat_map(|n| n.skips.iter().map(String::as_str))
            .collect();
        self.entries()
            .filter(|name| !on_chain.contains(name) && !skipped.contains(name))
            .map(str::to_string)
            .collect()
    }
}

fn declare_nodes<'a, I>(entries: I, errors: &mut Vec<Violation>) -> BTreeMap<String, Node>
where
    I: IntoIterator<Item = GraphEntry<'a>>,
{
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    for entry in entries {
        if nodes.contains_key(entry.name) {
            errors.push(Violation::DuplicateEntry {
                name: entry.name.to_string(),
            });
            continue;
        }

        let mut node = Node {
            declared: true,
            ..Node::default()
        };
        if entry.replaces == entry.name {
            errors.push(Violation::SelfReplace {
                name: entry.name.to_string(),
            });
        } else if !entry.replaces.is_empty() {
            node.replaces = Some(entry.replaces.to_string());
        }
        for skip in entry.skips {
            if skip == entry.name {
                errors.push(Violation::SelfSkip {
                    name: entry.name.to_string(),
                });
            } else if !skip.is_empty() {
                node.skips.push(skip.clone());
            }
        }
        nodes.insert(entry.name.to_string(), node);
    }
    nodes
}

/// Create placeholders for dangling targets and record reverse replaces edges
fn link_targets(nodes: &mut BTreeMap<String, Node>) {
    let mut edges: Vec<(String, Option<String>, Vec<String>)> = Vec::new();
    for (name, node) in nodes.iter() {
        edges.push((name.clone(), node.replaces.clone(), node.skips.clone()));
    }

    for (name, replaces, skips) in edges {
        if let Some(target) = replaces {
            nodes.entry(target).or_default().replaced_by.push(name);
        }
        for skip in skips {
            nodes.entry(skip).or_default();
        }
    }
}

fn incoming_counts(nodes: &BTreeMap<String, Node>) -> BTreeMap<&str, usize> {
    let mut incoming: BTreeMap<&str, usize> = nodes.keys().map(|k| (k.as_str(), 0)).collect();
    for node in nodes.values() {
        for target in node.targets() {
            *incoming.entry(target).or_default() += 1;
        }
    }
    incoming
}

/// Kahn traversal from `heads`; returns nodes left with incoming edges
fn drain_from(
    heads: &[String],
    nodes: &BTreeMap<String, Node>,
    incoming: &mut BTreeMap<&str, usize>,
) -> Vec<String> {
    let mut queue: VecDeque<&str> = heads.iter().map(String::as_str).collect();
    while let Some(name) = queue.pop_front() {
        let Some(node) = nodes.get(name) else {
            continue;
        };
        for target in node.targets() {
            if let Some(count) = incoming.get_mut(target) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    incoming
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(name, _)| (*name).to_string())
        .collect()
}
