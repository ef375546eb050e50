//! Concurrent dependency tree resolution
//!
//! Expands a root `(name, version spec)` request into the full transitive
//! dependency graph. Every distinct request pair is resolved exactly once
//! (single-flight), all discovered requests run concurrently on one task,
//! and cyclic dependency graphs converge instead of recursing forever.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;

use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use vine_core::error::{VineError, VineResult};
use vine_core::types::Manifest;

use crate::graph::Graph;
use crate::tree::DepGraph;

/// Outcome of resolving one `(name, version spec)` pair.
///
/// `manifest` is `None` when the resolver could identify the package but
/// found no manifest for it; the engine keeps such nodes as unexpandable
/// leaves rather than failing.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Opaque identifier naming this resolved package instance
    pub id: String,
    /// Declared metadata, when a manifest could be found
    pub manifest: Option<Manifest>,
}

/// External manifest-resolution collaborator.
///
/// Turns a `(name, version spec)` pair into a concrete package id and
/// manifest. The version spec is passed through opaquely; range semantics
/// live entirely behind this trait.
pub trait PackageResolver {
    fn resolve(
        &self,
        name: &str,
        spec: &str,
    ) -> impl Future<Output = VineResult<Resolution>>;
}

/// A manifest augmented with its node id and the ids of its resolved
/// direct dependencies.
///
/// Child links are node ids into the [`DepGraph`] manifest table rather
/// than owned references; the table is the single owner, so multiple
/// parents (and cycles) converge on one deduplicated entry.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    /// Node id of this package instance
    pub id: String,
    /// The declared manifest as returned by the resolver
    pub manifest: Manifest,
    /// Node ids of direct dependencies that resolved with a manifest
    pub resolved_dependencies: BTreeSet<String>,
}

impl ResolvedManifest {
    /// Package name from the manifest
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Resolved version from the manifest
    pub fn version(&self) -> &str {
        &self.manifest.version
    }
}

/// State of one memoized `(name, spec)` request.
enum RequestState {
    /// Resolution in flight; parents waiting to record an edge to the
    /// eventual node id.
    Pending(Vec<String>),
    /// Resolution complete; the node id every future parent connects to.
    Done(String),
}

fn request_key(name: &str, spec: &str) -> String {
    format!("{name}@{spec}")
}

fn issue<'a, R: PackageResolver>(
    resolver: &'a R,
    key: String,
    name: String,
    spec: String,
) -> LocalBoxFuture<'a, (String, VineResult<Resolution>)> {
    Box::pin(async move {
        let result = resolver.resolve(&name, &spec).await;
        (key, result)
    })
}

/// Resolve a package and all of its transitive dependencies into a
/// [`DepGraph`].
///
/// Each distinct `(name, spec)` pair triggers exactly one resolver call,
/// no matter how many branches request it; concurrent discoveries attach
/// to the in-flight request. A node is registered in the manifest table
/// before its children settle, which is what lets cyclic graphs resolve.
/// An id that resolves again through a different spec is not re-expanded.
///
/// Fan-out is unbounded: every newly discovered dependency issues its
/// request immediately. On very wide trees this can put significant load
/// on the resolver; callers needing admission control must provide it
/// inside their `PackageResolver`.
///
/// A resolver rejection aborts the whole call; a missing manifest does
/// not (the node stays as a dangling leaf and a warning is logged).
pub async fn resolve_tree<R: PackageResolver>(
    resolver: &R,
    name: &str,
    spec: &str,
) -> VineResult<DepGraph> {
    let mut graph = Graph::new();
    let mut packages: BTreeMap<String, ResolvedManifest> = BTreeMap::new();
    let mut deps_by_version: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut requests: HashMap<String, RequestState> = HashMap::new();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, (String, VineResult<Resolution>)>> =
        FuturesUnordered::new();

    let root_key = request_key(name, spec);
    requests.insert(root_key.clone(), RequestState::Pending(Vec::new()));
    in_flight.push(issue(resolver, root_key.clone(), name.to_string(), spec.to_string()));

    let mut root_id: Option<String> = None;

    while let Some((key, result)) = in_flight.next().await {
        let Resolution { id, manifest } = result?;
        debug!(request = %key, id = %id, "request settled");

        let parents = match requests.insert(key.clone(), RequestState::Done(id.clone())) {
            Some(RequestState::Pending(parents)) => parents,
            _ => Vec::new(),
        };
        if key == root_key {
            root_id = Some(id.clone());
        }
        // The child id is known now, so the deferred parent edges can be
        // recorded. This happens even for manifest-less leaves.
        for parent in &parents {
            graph.connect(parent.clone(), id.clone());
        }

        let Some(manifest) = manifest else {
            warn!(id = %id, "no manifest found; keeping as unexpandable leaf");
            continue;
        };

        if packages.contains_key(&id) {
            // A different spec converged on an already-expanded id; link it
            // up without re-expanding its children.
            for parent in &parents {
                if let Some(parent_pkg) = packages.get_mut(parent) {
                    parent_pkg.resolved_dependencies.insert(id.clone());
                }
            }
            continue;
        }

        deps_by_version
            .entry(manifest.name.clone())
            .or_default()
            .insert(manifest.version.clone());

        let dependencies: Vec<(String, String)> = manifest
            .dependencies
            .iter()
            .map(|(dep_name, dep_spec)| (dep_name.clone(), dep_spec.clone()))
            .collect();

        // Register before the children settle so cyclic discovery finds
        // this entry instead of recursing without bound.
        packages.insert(
            id.clone(),
            ResolvedManifest {
                id: id.clone(),
                manifest,
                resolved_dependencies: BTreeSet::new(),
            },
        );
        for parent in &parents {
            if let Some(parent_pkg) = packages.get_mut(parent) {
                parent_pkg.resolved_dependencies.insert(id.clone());
            }
        }

        for (dep_name, dep_spec) in dependencies {
            let dep_key = request_key(&dep_name, &dep_spec);
            match requests.get_mut(&dep_key) {
                Some(RequestState::Done(child_id)) => {
                    let child_id = child_id.clone();
                    graph.connect(id.clone(), child_id.clone());
                    if packages.contains_key(&child_id) {
                        if let Some(pkg) = packages.get_mut(&id) {
                            pkg.resolved_dependencies.insert(child_id);
                        }
                    }
                }
                Some(RequestState::Pending(waiting)) => {
                    waiting.push(id.clone());
                }
                None => {
                    requests.insert(dep_key.clone(), RequestState::Pending(vec![id.clone()]));
                    in_flight.push(issue(resolver, dep_key, dep_name, dep_spec));
                }
            }
        }
    }

    let root = root_id.ok_or_else(|| VineError::Resolution {
        message: format!("root request {name}@{spec} never completed"),
    })?;

    Ok(DepGraph::new(graph, packages, root, deps_by_version))
}

#[cfg(test)]
mod tests;
