//! Package manifest types.
//!
//! Defines the declared package metadata consumed by the resolution engine:
//! name, version, dependency specs, and authorship.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A package author or maintainer.
///
/// npm ships this either as a plain display string or as a structured
/// record, so both shapes deserialize through an untagged enum.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Maintainer {
    Plain(String),
    Detailed {
        name: Option<String>,
        email: Option<String>,
        url: Option<String>,
    },
}

impl Maintainer {
    /// Best-effort display name for this maintainer
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Maintainer::Plain(name) => Some(name),
            Maintainer::Detailed { name, email, .. } => {
                name.as_deref().or(email.as_deref())
            }
        }
    }
}

/// Declared package metadata as returned by the manifest resolver.
///
/// `dependencies` maps each dependency name to the version spec the package
/// declares for it (a semver range or dist-tag, passed through opaquely).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Maintainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Maintainer>>,
}

impl Manifest {
    /// Create a manifest with no dependencies or authorship
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies: BTreeMap::new(),
            author: None,
            maintainers: None,
        }
    }

    /// Check whether this manifest directly declares a dependency
    pub fn declares_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name)
    }
}
