//! Generic directed graph container
//!
//! Holds forward and backward adjacency sets for arbitrary identifiers.
//! The two maps are kept symmetric: an edge is present in `outgoing[src]`
//! exactly when it is present in `incoming[dst]`. The graph knows nothing
//! about package resolution.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

/// Directed graph over identifiers of type `T`.
///
/// Adjacency entries are created lazily on `connect` and pruned when
/// `disconnect` empties them, so absent keys and empty sets are
/// indistinguishable to callers. BTree collections keep iteration order
/// deterministic, which the rendering and traversal layers rely on for
/// reproducible output.
#[derive(Debug, Clone, Default)]
pub struct Graph<T: Ord> {
    outgoing: BTreeMap<T, BTreeSet<T>>,
    incoming: BTreeMap<T, BTreeSet<T>>,
    // Handed out by outgoing()/incoming() for vertices with no entry.
    empty: BTreeSet<T>,
}

impl<T: Ord + Clone> Graph<T> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            empty: BTreeSet::new(),
        }
    }

    /// Add a directed edge from `src` to `dst`, creating the adjacency
    /// entries lazily.
    ///
    /// Returns whether the edge already existed. A duplicate `connect` is a
    /// no-op on graph shape.
    pub fn connect(&mut self, src: T, dst: T) -> bool {
        let existed = !self
            .outgoing
            .entry(src.clone())
            .or_default()
            .insert(dst.clone());
        self.incoming.entry(dst).or_default().insert(src);
        existed
    }

    /// Remove the edge from `src` to `dst`, pruning adjacency entries that
    /// become empty.
    ///
    /// Returns whether the edge existed; removing an absent edge has no
    /// side effects.
    pub fn disconnect<Q>(&mut self, src: &Q, dst: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(outgoing) = self.outgoing.get_mut(src) else {
            return false;
        };
        let existed = outgoing.remove(dst);
        if outgoing.is_empty() {
            self.outgoing.remove(src);
        }

        if let Some(incoming) = self.incoming.get_mut(dst) {
            incoming.remove(src);
            if incoming.is_empty() {
                self.incoming.remove(dst);
            }
        }

        existed
    }

    /// Check whether the edge from `src` to `dst` exists
    pub fn is_connected<Q>(&self, src: &Q, dst: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.outgoing
            .get(src)
            .map(|set| set.contains(dst))
            .unwrap_or(false)
    }

    /// Edges leaving `src`. Returns a shared empty set when `src` has no
    /// outgoing edges; callers must treat the result as read-only.
    pub fn outgoing<Q>(&self, src: &Q) -> &BTreeSet<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.outgoing.get(src).unwrap_or(&self.empty)
    }

    /// Edges arriving at `dst`. Returns a shared empty set when `dst` has
    /// no incoming edges.
    pub fn incoming<Q>(&self, dst: &Q) -> &BTreeSet<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.incoming.get(dst).unwrap_or(&self.empty)
    }

    /// Number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }
}
