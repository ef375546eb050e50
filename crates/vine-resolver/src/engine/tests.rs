//! Unit tests for the resolution engine

use super::*;

use std::cell::RefCell;
use std::collections::HashMap;

use vine_core::error::VineError;
use vine_core::types::Manifest;

enum MockResponse {
    Found(Manifest),
    Missing,
    Fail,
}

/// Scripted resolver that counts how often each request pair is issued.
struct MockResolver {
    responses: HashMap<String, MockResponse>,
    calls: RefCell<HashMap<String, usize>>,
}

impl MockResolver {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: RefCell::new(HashMap::new()),
        }
    }

    fn package(mut self, name: &str, spec: &str, manifest: Manifest) -> Self {
        self.responses
            .insert(request_key(name, spec), MockResponse::Found(manifest));
        self
    }

    fn missing(mut self, name: &str, spec: &str) -> Self {
        self.responses
            .insert(request_key(name, spec), MockResponse::Missing);
        self
    }

    fn failing(mut self, name: &str, spec: &str) -> Self {
        self.responses
            .insert(request_key(name, spec), MockResponse::Fail);
        self
    }

    fn calls_for(&self, name: &str, spec: &str) -> usize {
        self.calls
            .borrow()
            .get(&request_key(name, spec))
            .copied()
            .unwrap_or(0)
    }
}

impl PackageResolver for MockResolver {
    fn resolve(&self, name: &str, spec: &str) -> impl Future<Output = VineResult<Resolution>> {
        let key = request_key(name, spec);
        *self.calls.borrow_mut().entry(key.clone()).or_insert(0) += 1;

        let result = match self.responses.get(&key) {
            Some(MockResponse::Found(manifest)) => Ok(Resolution {
                id: format!("{}@{}", manifest.name, manifest.version),
                manifest: Some(manifest.clone()),
            }),
            Some(MockResponse::Missing) => Ok(Resolution {
                id: key,
                manifest: None,
            }),
            Some(MockResponse::Fail) => Err(VineError::Network {
                message: format!("mock failure for {key}"),
                source: None,
            }),
            None => Err(VineError::PackageNotFound {
                name: name.to_string(),
            }),
        };

        async move {
            // Force a suspension point so sibling requests interleave.
            tokio::task::yield_now().await;
            result
        }
    }
}

fn manifest(name: &str, version: &str, deps: &[(&str, &str)]) -> Manifest {
    let mut m = Manifest::new(name, version);
    for (dep_name, dep_spec) in deps {
        m.dependencies
            .insert(dep_name.to_string(), dep_spec.to_string());
    }
    m
}

#[tokio::test]
async fn test_linear_chain() {
    let resolver = MockResolver::new()
        .package("root", "1.0.0", manifest("root", "1.0.0", &[("a", "^1.0.0")]))
        .package("a", "^1.0.0", manifest("a", "1.2.0", &[("b", "~2.0.0")]))
        .package("b", "~2.0.0", manifest("b", "2.0.3", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    assert_eq!(tree.root(), "root@1.0.0");
    assert_eq!(tree.root_manifest().unwrap().name(), "root");
    assert_eq!(tree.packages().count(), 3);
    assert!(tree.graph().is_connected("root@1.0.0", "a@1.2.0"));
    assert!(tree.graph().is_connected("a@1.2.0", "b@2.0.3"));
    assert!(!tree.graph().is_connected("root@1.0.0", "b@2.0.3"));

    let paths = tree.find_paths_to("b");
    assert_eq!(
        paths,
        vec![vec![
            "root@1.0.0".to_string(),
            "a@1.2.0".to_string(),
            "b@2.0.3".to_string()
        ]]
    );
}

#[tokio::test]
async fn test_diamond_single_flight() {
    let resolver = MockResolver::new()
        .package(
            "root",
            "1.0.0",
            manifest("root", "1.0.0", &[("a", "^1"), ("b", "^1")]),
        )
        .package("a", "^1", manifest("a", "1.0.0", &[("c", "^3.0.0")]))
        .package("b", "^1", manifest("b", "1.0.0", &[("c", "^3.0.0")]))
        .package("c", "^3.0.0", manifest("c", "3.1.4", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    // Both branches discovered (c, ^3.0.0) concurrently; one resolver call.
    assert_eq!(resolver.calls_for("c", "^3.0.0"), 1);

    let mut paths = tree.find_paths_to("c");
    paths.sort();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], vec!["root@1.0.0", "a@1.0.0", "c@3.1.4"]);
    assert_eq!(paths[1], vec!["root@1.0.0", "b@1.0.0", "c@3.1.4"]);
    for path in &paths {
        assert_eq!(path.len(), 3);
        assert_eq!(path.iter().filter(|id| *id == "root@1.0.0").count(), 1);
    }
}

#[tokio::test]
async fn test_wide_fan_in_resolves_shared_dep_once() {
    let mut resolver = MockResolver::new().package(
        "root",
        "1.0.0",
        manifest(
            "root",
            "1.0.0",
            &[
                ("x1", "*"),
                ("x2", "*"),
                ("x3", "*"),
                ("x4", "*"),
                ("x5", "*"),
            ],
        ),
    );
    for i in 1..=5 {
        let name = format!("x{i}");
        resolver = resolver.package(
            &name,
            "*",
            manifest(&name, "1.0.0", &[("shared", "^2.0.0")]),
        );
    }
    resolver = resolver.package("shared", "^2.0.0", manifest("shared", "2.5.0", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    assert_eq!(resolver.calls_for("shared", "^2.0.0"), 1);
    assert_eq!(tree.graph().incoming("shared@2.5.0").len(), 5);
    assert_eq!(tree.find_paths_to("shared").len(), 5);
}

#[tokio::test]
async fn test_distinct_specs_converging_on_one_id() {
    let resolver = MockResolver::new()
        .package(
            "root",
            "1.0.0",
            manifest("root", "1.0.0", &[("a", "^1"), ("b", "^1")]),
        )
        .package("a", "^1", manifest("a", "1.0.0", &[("c", "^3.0.0")]))
        .package("b", "^1", manifest("b", "1.0.0", &[("c", "3.1.4")]))
        .package("c", "^3.0.0", manifest("c", "3.1.4", &[("d", "*")]))
        .package("c", "3.1.4", manifest("c", "3.1.4", &[("d", "*")]))
        .package("d", "*", manifest("d", "1.0.0", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    // Each distinct spec resolved once; the results converge on one node.
    assert_eq!(resolver.calls_for("c", "^3.0.0"), 1);
    assert_eq!(resolver.calls_for("c", "3.1.4"), 1);
    assert_eq!(resolver.calls_for("d", "*"), 1);

    let versions: Vec<_> = tree.versions_of("c").unwrap().iter().cloned().collect();
    assert_eq!(versions, vec!["3.1.4".to_string()]);
    assert_eq!(tree.graph().incoming("c@3.1.4").len(), 2);

    // Both parents hold the deduplicated child link.
    for parent in ["a@1.0.0", "b@1.0.0"] {
        let pkg = tree.manifest(parent).unwrap();
        assert!(pkg.resolved_dependencies.contains("c@3.1.4"));
    }
}

#[tokio::test]
async fn test_same_name_two_versions_recorded() {
    let resolver = MockResolver::new()
        .package(
            "root",
            "1.0.0",
            manifest("root", "1.0.0", &[("a", "^1"), ("b", "^1")]),
        )
        .package("a", "^1", manifest("a", "1.0.0", &[("dup", "^1.0.0")]))
        .package("b", "^1", manifest("b", "1.0.0", &[("dup", "^2.0.0")]))
        .package("dup", "^1.0.0", manifest("dup", "1.9.0", &[]))
        .package("dup", "^2.0.0", manifest("dup", "2.3.0", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    let versions: Vec<_> = tree.versions_of("dup").unwrap().iter().cloned().collect();
    assert_eq!(versions, vec!["1.9.0".to_string(), "2.3.0".to_string()]);
    assert_eq!(tree.find_paths_to("dup").len(), 2);
}

#[tokio::test]
async fn test_missing_manifest_becomes_dangling_leaf() {
    let resolver = MockResolver::new()
        .package("root", "1.0.0", manifest("root", "1.0.0", &[("ghost", "*")]))
        .missing("ghost", "*");

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    // The edge exists, but the target has no manifest-table entry.
    assert!(tree.graph().is_connected("root@1.0.0", "ghost@*"));
    assert!(tree.manifest("ghost@*").is_none());
    assert!(!tree.contains_package("ghost"));
    assert_eq!(tree.packages().count(), 1);
}

#[tokio::test]
async fn test_missing_root_manifest() {
    let resolver = MockResolver::new().missing("root", "latest");

    let tree = resolve_tree(&resolver, "root", "latest").await.unwrap();
    assert_eq!(tree.root(), "root@latest");
    assert!(tree.root_manifest().is_none());
}

#[tokio::test]
async fn test_cycle_converges() {
    let resolver = MockResolver::new()
        .package("a", "^1", manifest("a", "1.0.0", &[("b", "^1")]))
        .package("b", "^1", manifest("b", "1.0.0", &[("a", "^1")]));

    let tree = resolve_tree(&resolver, "a", "^1").await.unwrap();

    assert_eq!(resolver.calls_for("a", "^1"), 1);
    assert_eq!(resolver.calls_for("b", "^1"), 1);
    assert!(tree.graph().is_connected("a@1.0.0", "b@1.0.0"));
    assert!(tree.graph().is_connected("b@1.0.0", "a@1.0.0"));

    let a = tree.manifest("a@1.0.0").unwrap();
    let b = tree.manifest("b@1.0.0").unwrap();
    assert!(a.resolved_dependencies.contains("b@1.0.0"));
    assert!(b.resolved_dependencies.contains("a@1.0.0"));

    // The bounded renderer terminates and marks the back edge.
    let rendered = tree.to_string();
    assert_eq!(rendered, "a@1.0.0\n  b@1.0.0\n    a@1.0.0 [cyclic]");
}

#[tokio::test]
async fn test_self_dependency() {
    let resolver = MockResolver::new().package(
        "narcissus",
        "^1",
        manifest("narcissus", "1.0.0", &[("narcissus", "^1")]),
    );

    let tree = resolve_tree(&resolver, "narcissus", "^1").await.unwrap();

    assert_eq!(resolver.calls_for("narcissus", "^1"), 1);
    assert!(tree.graph().is_connected("narcissus@1.0.0", "narcissus@1.0.0"));
    let pkg = tree.root_manifest().unwrap();
    assert!(pkg.resolved_dependencies.contains("narcissus@1.0.0"));
}

#[tokio::test]
async fn test_resolver_failure_aborts() {
    let resolver = MockResolver::new()
        .package("root", "1.0.0", manifest("root", "1.0.0", &[("bad", "*")]))
        .failing("bad", "*");

    let result = resolve_tree(&resolver, "root", "1.0.0").await;
    assert!(matches!(result, Err(VineError::Network { .. })));
}

#[tokio::test]
async fn test_unknown_package_rejects() {
    let resolver = MockResolver::new();

    let result = resolve_tree(&resolver, "nope", "latest").await;
    assert!(matches!(result, Err(VineError::PackageNotFound { .. })));
}

#[tokio::test]
async fn test_traverse_false_visits_only_root() {
    let resolver = MockResolver::new()
        .package("root", "1.0.0", manifest("root", "1.0.0", &[("a", "^1")]))
        .package("a", "^1", manifest("a", "1.0.0", &[]));

    let tree = resolve_tree(&resolver, "root", "1.0.0").await.unwrap();

    let mut visited = Vec::new();
    tree.traverse_deps(|pkg, _| {
        visited.push(pkg.id.clone());
        false
    });
    assert_eq!(visited, vec!["root@1.0.0".to_string()]);
}
