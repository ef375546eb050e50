//! Core types and error handling shared across the Vine workspace.

pub mod error;
pub mod types;

pub use error::{VineError, VineResult};
pub use types::{Maintainer, Manifest};
