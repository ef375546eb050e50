//! ecosyste.ms popularity API client
//!
//! Fetches download-sorted package lists (most popular packages overall,
//! and the dependent packages of a given package) from the ecosyste.ms
//! registry API. Responses are cached per URL for three hours and the
//! cache is persisted to disk between runs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use vine_core::error::VineError;

use crate::cache::ResponseCache;
use crate::RegistryResult;

/// How long a popularity response stays fresh (3 hours)
const POPULARITY_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// One package record from the ecosyste.ms registry API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryPackage {
    /// Package name
    pub name: String,
    /// Total download count, when the API knows it
    pub downloads: Option<u64>,
    /// Timestamp of the latest release, RFC 3339
    pub latest_release_published_at: Option<String>,
}

impl RegistryPackage {
    /// Parsed latest-release timestamp, if present and well formed
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.latest_release_published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Client for the ecosyste.ms package popularity API
#[derive(Debug)]
pub struct PopularityClient {
    client: Client,
    base_url: String,
    cache: ResponseCache<Vec<RegistryPackage>>,
    cache_path: Option<PathBuf>,
}

impl PopularityClient {
    /// Create a client, loading the persisted response cache from
    /// `cache_path` when one is given. A corrupt or unreadable snapshot
    /// degrades to an empty cache with a warning.
    pub fn new(cache_path: Option<PathBuf>) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent("vine/0.1.0")
            .build()
            .map_err(|e| VineError::network("Failed to create HTTP client".to_string(), e))?;

        let cache = match &cache_path {
            Some(path) => ResponseCache::load(path).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring unusable popularity cache");
                ResponseCache::new()
            }),
            None => ResponseCache::new(),
        };

        Ok(Self {
            client,
            base_url: "https://packages.ecosyste.ms/api/v1".to_string(),
            cache,
            cache_path,
        })
    }

    /// The most popular packages on the npm registry, sorted by downloads
    pub async fn fetch_popular_packages(
        &self,
        max_results: usize,
    ) -> RegistryResult<Vec<RegistryPackage>> {
        let mut url = self.endpoint("registries/npmjs.org/packages")?;
        url.query_pairs_mut()
            .append_pair("page", "0")
            .append_pair("per_page", &max_results.to_string())
            .append_pair("sort", "downloads")
            .append_pair("order", "desc");
        self.fetch_cached(url).await
    }

    /// Packages depending on `package_name`, sorted by downloads
    pub async fn fetch_dependent_packages(
        &self,
        package_name: &str,
        max_results: usize,
    ) -> RegistryResult<Vec<RegistryPackage>> {
        let mut url = self.endpoint(&format!(
            "registries/npmjs.org/packages/{package_name}/dependent_packages"
        ))?;
        url.query_pairs_mut()
            .append_pair("page", "0")
            .append_pair("per_page", &max_results.to_string())
            .append_pair("sort", "downloads")
            .append_pair("order", "desc")
            .append_pair("latest", "true");
        self.fetch_cached(url).await
    }

    fn endpoint(&self, path: &str) -> RegistryResult<Url> {
        Url::parse(&format!("{}/{}", self.base_url, path)).map_err(|e| VineError::Decode {
            message: format!("invalid popularity API URL: {e}"),
        })
    }

    /// Fetch a URL through the time-boxed cache, persisting the cache
    /// after each live fetch.
    async fn fetch_cached(&self, url: Url) -> RegistryResult<Vec<RegistryPackage>> {
        let key = url.to_string();
        if let Some(packages) = self.cache.get(&key) {
            debug!(url = %key, "popularity cache hit");
            return Ok(packages);
        }

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| VineError::network(format!("Failed to fetch popularity data: {e}"), e))?;

        if !response.status().is_success() {
            return Err(VineError::Network {
                message: format!("Popularity API returned status {}", response.status()),
                source: None,
            });
        }

        let packages = response
            .json::<Vec<RegistryPackage>>()
            .await
            .map_err(|e| VineError::Decode {
                message: format!("invalid popularity response: {e}"),
            })?;

        self.cache
            .insert_with_ttl(key, packages.clone(), POPULARITY_TTL);
        if let Some(path) = &self.cache_path {
            if let Err(err) = self.cache.persist(path) {
                warn!(path = %path.display(), error = %err, "failed to persist popularity cache");
            }
        }

        Ok(packages)
    }
}
