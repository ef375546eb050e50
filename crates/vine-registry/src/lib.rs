//! npm registry and popularity API clients for Vine
//!
//! This crate provides the external collaborators of the resolution engine:
//! an npm registry client that turns `(name, version spec)` pairs into
//! concrete manifests, and an ecosyste.ms client for package popularity
//! queries, both backed by a time-boxed response cache.

pub mod api;
pub mod cache;
pub mod client;
pub mod popularity;

// Re-export main types
pub use api::{Packument, VersionMetadata};
pub use cache::{CacheEntry, ResponseCache};
pub use client::{RegistryClient, RetryConfig};
pub use popularity::{PopularityClient, RegistryPackage};

use vine_core::error::VineError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, VineError>;
