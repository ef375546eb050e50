//! npm registry API response types

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use vine_core::types::{Maintainer, Manifest};

/// Package metadata response from the npm registry (a "packument")
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Packument {
    /// Package name
    pub name: String,
    /// Dist-tag to version mapping (e.g. "latest" -> "4.17.21")
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// All published versions
    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
}

/// Metadata for a specific package version
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionMetadata {
    /// Version string
    pub version: String,
    /// Package description
    pub description: Option<String>,
    /// Declared runtime dependencies
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Package author
    pub author: Option<Maintainer>,
    /// Package maintainers
    pub maintainers: Option<Vec<Maintainer>>,
}

impl VersionMetadata {
    /// Convert registry version metadata into the manifest shape the
    /// resolution engine consumes. The name comes from the packument;
    /// version entries do not reliably repeat it.
    pub fn into_manifest(self, name: &str) -> Manifest {
        Manifest {
            name: name.to_string(),
            version: self.version,
            dependencies: self.dependencies,
            author: self.author,
            maintainers: self.maintainers,
        }
    }
}
