//! npm registry client and manifest resolution
//!
//! Fetches packuments over HTTP with connection pooling and retry logic,
//! and implements the engine's [`PackageResolver`] contract by matching a
//! version spec (dist-tag, exact version, or semver range) against the
//! published versions.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use vine_core::error::VineError;
use vine_resolver::engine::{PackageResolver, Resolution};

use crate::api::{Packument, VersionMetadata};
use crate::cache::ResponseCache;
use crate::RegistryResult;

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// HTTP client for npm registry packument reads
#[derive(Debug)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL
    base_url: String,
    /// Packument cache, keyed by package name
    cache: ResponseCache<Packument>,
}

impl RegistryClient {
    /// Create new registry client with connection pooling
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(RetryConfig::default())
    }

    fn with_config(retry_config: RetryConfig) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent("vine/0.1.0")
            .build()
            .map_err(|e| VineError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry_config,
            base_url: "https://registry.npmjs.org".to_string(),
            cache: ResponseCache::new(),
        })
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    // Not-found responses never succeed on retry
                    let retryable = !matches!(error, VineError::PackageNotFound { .. });
                    last_error = Some(error);

                    if !retryable || attempt == self.retry_config.max_retries {
                        break;
                    }

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                }
            }
        }

        Err(last_error.unwrap_or_else(|| VineError::Network {
            message: "Retry operation failed without error".to_string(),
            source: None,
        }))
    }

    /// Fetch a packument, consulting the in-memory cache first
    pub async fn fetch_packument(&self, package_name: &str) -> RegistryResult<Packument> {
        if let Some(packument) = self.cache.get(package_name) {
            debug!(package = %package_name, "packument cache hit");
            return Ok(packument);
        }

        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);

        let packument = self
            .with_retry(|| async {
                let response = self
                    .client
                    .get(&url)
                    .header("Accept", "application/vnd.npm.install-v1+json")
                    .send()
                    .await
                    .map_err(|e| {
                        VineError::network(format!("Failed to fetch packument: {e}"), e)
                    })?;

                match response.status() {
                    reqwest::StatusCode::OK => {
                        response.json::<Packument>().await.map_err(|e| VineError::Decode {
                            message: format!("invalid packument for {package_name}: {e}"),
                        })
                    }
                    reqwest::StatusCode::NOT_FOUND => Err(VineError::PackageNotFound {
                        name: package_name.to_string(),
                    }),
                    status => Err(VineError::Network {
                        message: format!("Registry returned status {status}: {package_name}"),
                        source: None,
                    }),
                }
            })
            .await?;

        self.cache.insert(package_name.to_string(), packument.clone());
        Ok(packument)
    }

    /// Encode package name for URL (handle scoped packages)
    fn encode_package_name(name: &str) -> String {
        if name.starts_with('@') {
            // Scoped package: @org/pkg -> @org%2fpkg
            name.replace('/', "%2f")
        } else {
            name.to_string()
        }
    }

    /// Match a version spec against the packument: dist-tag first, then an
    /// exact version, then the highest version satisfying the spec as a
    /// semver range.
    fn match_version<'a>(packument: &'a Packument, spec: &str) -> Option<&'a VersionMetadata> {
        if let Some(tagged) = packument.dist_tags.get(spec) {
            return packument.versions.get(tagged);
        }
        if let Some(exact) = packument.versions.get(spec) {
            return Some(exact);
        }

        let req = semver::VersionReq::parse(spec).ok()?;
        packument
            .versions
            .keys()
            .filter_map(|v| semver::Version::parse(v).ok())
            .filter(|v| req.matches(v))
            .max()
            .and_then(|best| packument.versions.get(&best.to_string()))
    }
}

impl PackageResolver for RegistryClient {
    /// Resolve a `(name, spec)` pair to a concrete manifest.
    ///
    /// An unknown package or a spec matching no published version yields a
    /// manifest-less resolution (the engine keeps it as a leaf); transport
    /// and decode failures reject.
    fn resolve(
        &self,
        name: &str,
        spec: &str,
    ) -> impl Future<Output = vine_core::error::VineResult<Resolution>> {
        async move {
            let packument = match self.fetch_packument(name).await {
                Ok(packument) => packument,
                Err(VineError::PackageNotFound { .. }) => {
                    return Ok(Resolution {
                        id: format!("{name}@{spec}"),
                        manifest: None,
                    });
                }
                Err(err) => return Err(err),
            };

            match Self::match_version(&packument, spec) {
                Some(version_meta) => {
                    let manifest = version_meta.clone().into_manifest(&packument.name);
                    Ok(Resolution {
                        id: format!("{}@{}", packument.name, manifest.version),
                        manifest: Some(manifest),
                    })
                }
                None => Ok(Resolution {
                    id: format!("{name}@{spec}"),
                    manifest: None,
                }),
            }
        }
    }
}
