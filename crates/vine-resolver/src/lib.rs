//! Dependency tree resolution engine and graph query layer for Vine
//!
//! This crate expands a package into its full transitive dependency graph
//! with concurrent, deduplicated resolution, and provides the traversal
//! algorithms (path search, pruned forward traversal, bounded rendering)
//! that answer questions about that graph.

pub mod engine;
pub mod graph;
pub mod tree;

// Re-export main types
pub use engine::{resolve_tree, PackageResolver, Resolution, ResolvedManifest};
pub use graph::Graph;
pub use tree::DepGraph;

use vine_core::error::VineError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, VineError>;
