//! Error types and result aliases for Vine operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the Vine workspace with actionable error messages.

use thiserror::Error;

/// Unified error type for all Vine operations
#[derive(Error, Debug)]
pub enum VineError {
    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("No version of '{name}' matches '{spec}'")]
    NoMatchingVersion { name: String, spec: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to decode registry response: {message}")]
    Decode { message: String },

    // Resolution errors
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    // CLI errors
    #[error("Invalid package identifier '{spec}': {reason}")]
    InvalidPackageSpec { spec: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Vine operations
pub type VineResult<T> = Result<T, VineError>;

impl VineError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VineError::Network { .. } | VineError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            VineError::PackageNotFound { .. } => {
                Some("Check the package name spelling against the npm registry")
            },
            VineError::NoMatchingVersion { .. } => {
                Some("Check the version or dist-tag; omit it to resolve 'latest'")
            },
            VineError::Network { .. } => Some("Check your internet connection and try again"),
            VineError::InvalidPackageSpec { .. } => {
                Some("Use 'name' or 'name@version', e.g. lodash@4.17.21")
            },
            _ => None,
        }
    }
}
