//! Upgrade-path filling between a bundle and its channel head
//!
//! A consumer that already holds the `replaces` chain up to `start` must be
//! able to reach `head`. The set returned by [`intersect`] is what it needs on
//! top of that:
//!
//! 1. Collect `start`'s own replaces chain.
//! 2. Walk `head`'s replaces chain until it meets that chain; the meeting
//!    point is the intersection.
//! 3. Gather every bundle that transitively replaces the intersection.
//! 4. Drop the bundles strictly between `start` and the intersection, then
//!    make sure `start` and `head` are present.

use std::collections::BTreeSet;

use crate::model::{Bundle, Channel};

/// Bundles needed to keep `head` reachable from `start`
///
/// Returns the bundle names and whether the two replaces chains meet at all.
/// When they do not, or the channel graph does not build, the set is empty and
/// the caller decides what to do.
pub fn intersect(channel: &Channel, start: &Bundle, head: &Bundle) -> (BTreeSet<String>, bool) {
    if start.name == head.name {
        return (BTreeSet::from([head.name.clone()]), true);
    }
    let Ok(graph) = channel.graph() else {
        return (BTreeSet::new(), false);
    };

    // Start's chain in walk order, starting with `start` itself
    let start_chain = graph.replaces_chain(&start.name);

    let Some(intersection) = graph
        .replaces_chain(&head.name)
        .into_iter()
        .find(|name| start_chain.contains(name))
    else {
        return (BTreeSet::new(), false);
    };

    let mut found: BTreeSet<&str> = BTreeSet::new();
    let mut stack = vec![intersection];
    while let Some(name) = stack.pop() {
        if found.insert(name) {
            stack.extend(graph.replaced_by(name).iter().map(String::as_str));
        }
    }

    for between in start_chain
        .iter()
        .skip(1)
        .take_while(|name| **name != intersection)
    {
        found.remove(between);
    }

    let mut path: BTreeSet<String> = found
        .into_iter()
        .filter(|name| graph.contains(name))
        .map(str::to_string)
        .collect();
    path.insert(start.name.clone());
    path.insert(head.name.clone());
    (path, true)
}
