//! Cache directory configuration.

use std::path::PathBuf;

/// Directory for persisted response caches.
///
/// `$VINE_CACHE_DIR` takes precedence; otherwise the platform cache
/// directory with a `vine` subdirectory. `None` when neither is available,
/// in which case caching stays in memory only.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("VINE_CACHE_DIR") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    dirs::cache_dir().map(|base| base.join("vine"))
}

/// Location of the persisted popularity API cache.
pub fn popularity_cache_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("popularity.json"))
}
