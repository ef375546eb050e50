//! Shared data types for package metadata.

mod manifest;

pub use manifest::{Maintainer, Manifest};
