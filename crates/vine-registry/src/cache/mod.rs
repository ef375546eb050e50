//! Time-boxed response caching with optional disk persistence

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use vine_core::error::{VineError, VineResult};

/// Default time-to-live for cached responses (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry with TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached value
    pub value: T,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Create new cache entry with the default TTL
    pub fn new(value: T) -> Self {
        Self::with_ttl(value, DEFAULT_TTL)
    }

    /// Create cache entry with custom TTL
    pub fn with_ttl(value: T, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }

    /// Get age of cache entry
    pub fn age(&self) -> Option<Duration> {
        self.stored_at.elapsed().ok()
    }
}

/// In-memory keyed cache with per-entry TTL.
///
/// Values are cloned out on access; stale entries are evicted lazily on
/// `get` or in bulk via `cleanup`.
#[derive(Debug)]
pub struct ResponseCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
}

impl<T: Clone> ResponseCache<T> {
    /// Create new empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get a cached value if fresh
    pub fn get(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh() {
            Some(entry.value.clone())
        } else {
            drop(entry);
            // Remove stale entry
            self.entries.remove(key);
            None
        }
    }

    /// Store a value with the default TTL
    pub fn insert(&self, key: String, value: T) {
        self.entries.insert(key, CacheEntry::new(value));
    }

    /// Store a value with a custom TTL
    pub fn insert_with_ttl(&self, key: String, value: T, ttl: Duration) {
        self.entries.insert(key, CacheEntry::with_ttl(value, ttl));
    }

    /// Number of entries currently held, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove stale entries, returning how many were dropped
    pub fn cleanup(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_fresh() {
                true
            } else {
                removed += 1;
                false
            }
        });
        removed
    }
}

impl<T: Clone + Serialize + DeserializeOwned> ResponseCache<T> {
    /// Load a cache snapshot from disk. A missing file yields an empty
    /// cache; stale entries are dropped on load.
    pub fn load(path: &Path) -> VineResult<Self> {
        let cache = Self::new();
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(cache),
            Err(err) => {
                return Err(VineError::io(
                    format!("Failed to read cache file {}", path.display()),
                    err,
                ))
            }
        };

        let snapshot: BTreeMap<String, CacheEntry<T>> =
            serde_json::from_slice(&data).map_err(|err| VineError::Decode {
                message: format!("corrupt cache file {}: {err}", path.display()),
            })?;

        for (key, entry) in snapshot {
            if entry.is_fresh() {
                cache.entries.insert(key, entry);
            }
        }
        Ok(cache)
    }

    /// Write the fresh entries to disk as a JSON snapshot, creating parent
    /// directories as needed.
    pub fn persist(&self, path: &Path) -> VineResult<()> {
        self.cleanup();

        let snapshot: BTreeMap<String, CacheEntry<T>> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                VineError::io(
                    format!("Failed to create cache directory {}", parent.display()),
                    err,
                )
            })?;
        }

        let data = serde_json::to_vec(&snapshot).map_err(|err| VineError::Decode {
            message: format!("failed to serialize cache snapshot: {err}"),
        })?;
        std::fs::write(path, data).map_err(|err| {
            VineError::io(
                format!("Failed to write cache file {}", path.display()),
                err,
            )
        })
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
