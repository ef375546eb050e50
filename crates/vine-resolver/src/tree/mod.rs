//! Dependency graph query facade
//!
//! Wraps the finished graph, the manifest table, the root id, and the
//! per-name version index produced by resolution. The engine is the sole
//! producer; a [`DepGraph`] is an immutable snapshot once returned.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::engine::ResolvedManifest;
use crate::graph::Graph;

/// Any single node is expanded at most this many times across one
/// rendering, independent of cycle handling. Keeps output bounded on
/// graphs with many converging paths.
const MAX_PRINTS: usize = 5;

/// A fully resolved dependency tree and its query operations.
#[derive(Debug, Clone)]
pub struct DepGraph {
    graph: Graph<String>,
    packages: BTreeMap<String, ResolvedManifest>,
    root: String,
    deps_by_version: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    pub(crate) fn new(
        graph: Graph<String>,
        packages: BTreeMap<String, ResolvedManifest>,
        root: String,
        deps_by_version: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            graph,
            packages,
            root,
            deps_by_version,
        }
    }

    /// Node id of the root package
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Manifest of the root package, absent only if the root itself could
    /// not be resolved to a manifest
    pub fn root_manifest(&self) -> Option<&ResolvedManifest> {
        self.packages.get(&self.root)
    }

    /// Look up a resolved manifest by node id
    pub fn manifest(&self, id: &str) -> Option<&ResolvedManifest> {
        self.packages.get(id)
    }

    /// All resolved manifests in the tree
    pub fn packages(&self) -> impl Iterator<Item = &ResolvedManifest> {
        self.packages.values()
    }

    /// The underlying directed graph
    pub fn graph(&self) -> &Graph<String> {
        &self.graph
    }

    /// Every distinct version of `name` resolved anywhere in the tree
    pub fn versions_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.deps_by_version.get(name)
    }

    /// Whether any version of `name` appears anywhere in the tree
    pub fn contains_package(&self, name: &str) -> bool {
        self.deps_by_version.contains_key(name)
    }

    /// Find every simple path from the root to a package with the given
    /// name.
    ///
    /// Matches every node whose manifest name equals `package_name` (one
    /// per distinct version in the tree) and walks backward along incoming
    /// edges, collecting each path that reaches the root without repeating
    /// a node. Paths are ordered root first, match last.
    ///
    /// Enumeration is exhaustive, so diamond-heavy graphs can produce an
    /// exponential number of paths.
    pub fn find_paths_to(&self, package_name: &str) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        for (id, pkg) in &self.packages {
            if pkg.manifest.name == package_name {
                let mut path = vec![id.clone()];
                self.walk_back(id, &mut path, &mut paths);
            }
        }
        paths
    }

    fn walk_back(&self, node: &str, path: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
        if node == self.root {
            let mut found = path.clone();
            found.reverse();
            paths.push(found);
            return;
        }

        for dependent in self.graph.incoming(node) {
            if path.iter().any(|seen| seen == dependent) {
                continue;
            }
            path.push(dependent.clone());
            self.walk_back(dependent, path, paths);
            path.pop();
        }
    }

    /// Depth-first forward traversal from the root with caller-controlled
    /// pruning.
    ///
    /// The callback receives each visited manifest and the path of node
    /// ids leading to it (root first). Returning `true` expands the node's
    /// resolved dependencies; returning `false` treats it as a leaf for
    /// this branch. Nodes already on the current path are never re-pushed,
    /// so traversal terminates on cyclic graphs.
    pub fn traverse_deps<F>(&self, mut callback: F)
    where
        F: FnMut(&ResolvedManifest, &[String]) -> bool,
    {
        let mut stack = vec![(self.root.clone(), vec![self.root.clone()])];

        while let Some((id, path)) = stack.pop() {
            let Some(pkg) = self.packages.get(&id) else {
                continue;
            };
            if !callback(pkg, &path) {
                continue;
            }
            for dep_id in &pkg.resolved_dependencies {
                if !path.iter().any(|seen| seen == dep_id) {
                    let mut next_path = path.clone();
                    next_path.push(dep_id.clone());
                    stack.push((dep_id.clone(), next_path));
                }
            }
        }
    }
}

impl fmt::Display for DepGraph {
    /// Bounded preorder dump of the graph from the root.
    ///
    /// Indentation is proportional to depth. An edge back into the current
    /// path is rendered inline as `[cyclic]` and not expanded. Beyond the
    /// per-path cycle guard, any node is expanded at most [`MAX_PRINTS`]
    /// times across the whole rendering; later encounters that still have
    /// children are annotated instead of expanded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        let mut visited_count: HashMap<&String, usize> = HashMap::new();
        let mut stack: Vec<(&String, usize, Vec<&String>)> =
            vec![(&self.root, 0, vec![&self.root])];

        while let Some((node, indent, path)) = stack.pop() {
            let count = visited_count.get(node).copied().unwrap_or(0);
            let outgoing = self.graph.outgoing(node);
            let line = format!("{}{}", "  ".repeat(indent), node);

            if count >= MAX_PRINTS {
                if outgoing.is_empty() {
                    lines.push(line);
                } else {
                    lines.push(format!("{line} [already printed {MAX_PRINTS} times]"));
                }
                continue;
            }
            visited_count.insert(node, count + 1);
            lines.push(line);

            // Reverse push so siblings pop off the stack in sorted order.
            for child in outgoing.iter().rev() {
                if path.contains(&child) {
                    lines.push(format!("{}{} [cyclic]", "  ".repeat(indent + 1), child));
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(child);
                stack.push((child, indent + 1, next_path));
            }
        }

        f.write_str(&lines.join("\n"))
    }
}
