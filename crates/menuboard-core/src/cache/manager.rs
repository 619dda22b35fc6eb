use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiError;

/// Prefix shared by every entry this cache writes.
pub const DEFAULT_NAMESPACE: &str = "menuboard_cache_";

/// Entries older than this are discarded on read.
/// Menu data changes rarely during a session but edits should show up quickly.
pub const DEFAULT_TTL_MINUTES: i64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_display(&self) -> String {
        let age = self.age();
        if age < Duration::minutes(1) {
            // Clock skew lands here too
            "just now".to_string()
        } else if age < Duration::hours(1) {
            format!("{}m ago", age.num_minutes())
        } else if age < Duration::days(1) {
            format!("{}h ago", age.num_hours())
        } else {
            format!("{}d ago", age.num_days())
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

/// Time-limited key/value cache stored as one JSON file per key.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
    namespace: String,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        Self::with_settings(
            cache_dir,
            DEFAULT_NAMESPACE,
            Duration::minutes(DEFAULT_TTL_MINUTES),
        )
    }

    pub fn with_settings(cache_dir: PathBuf, namespace: &str, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self {
            cache_dir,
            namespace: namespace.to_string(),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}.json", self.namespace, urlencoding::encode(key)))
    }

    /// Read an entry with its timestamp. Expired or unreadable entries are
    /// removed and reported as missing.
    pub fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedData<T>>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry: {}", key))?;

        let cached: CachedData<T> = match serde_json::from_str(&contents) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable cache entry");
                self.remove(key)?;
                return Ok(None);
            }
        };

        if cached.is_expired(self.ttl) {
            debug!(key, "Cache entry expired");
            self.remove(key)?;
            return Ok(None);
        }

        Ok(Some(cached))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.get_entry(key)?.map(|cached| cached.data))
    }

    /// Store `data` under `key`, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.entry_path(key), contents)
            .with_context(|| format!("Failed to write cache entry: {}", key))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache entry: {}", key))?;
        }
        Ok(())
    }

    /// Keys currently stored under this namespace, expired or not
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(encoded) = name
                .strip_prefix(&self.namespace)
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            if let Ok(key) = urlencoding::decode(encoded) {
                keys.push(key.into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Remove every entry in this namespace. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let keys = self.keys()?;
        for key in &keys {
            self.remove(key)?;
        }
        debug!(count = keys.len(), namespace = %self.namespace, "Cache cleared");
        Ok(keys.len())
    }

    /// Cache key for a GET of `endpoint`
    pub fn request_key(endpoint: &str) -> String {
        format!("{}_GET", endpoint)
    }

    /// Return the cached rows for a GET of `endpoint`, or run `fetch` and
    /// cache its result. Cache I/O problems are logged and bypassed.
    pub async fn fetch_cached<T, F, Fut>(&self, endpoint: &str, fetch: F) -> Result<Vec<T>, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ApiError>>,
    {
        let key = Self::request_key(endpoint);
        match self.get::<Vec<T>>(&key) {
            Ok(Some(rows)) => {
                debug!(key = %key, "Cache hit");
                return Ok(rows);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }

        let rows = fetch().await?;
        if let Err(e) = self.set(&key, &rows) {
            warn!(key = %key, error = %e, "Cache write failed");
        }
        Ok(rows)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache() -> (TempDir, CacheManager) {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        (dir, cache)
    }

    /// Write an entry whose timestamp is `minutes` in the past
    fn backdate(cache: &CacheManager, key: &str, minutes: i64) {
        let mut cached = CachedData::new(vec![1, 2, 3]);
        cached.cached_at = Utc::now() - Duration::minutes(minutes);
        std::fs::write(cache.entry_path(key), serde_json::to_string(&cached).unwrap()).unwrap();
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, cache) = cache();
        cache.set("categories", &vec!["a", "b"]).unwrap();
        let value: Option<Vec<String>> = cache.get("categories").unwrap();
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let (_dir, cache) = cache();
        backdate(&cache, "products", 4);

        let value: Option<Vec<i32>> = cache.get("products").unwrap();
        assert!(value.is_none());
        assert!(!cache.entry_path("products").exists());
    }

    #[test]
    fn test_entry_within_ttl_survives() {
        let (_dir, cache) = cache();
        backdate(&cache, "products", 2);

        let value: Option<Vec<i32>> = cache.get("products").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_last_write_wins() {
        let (_dir, cache) = cache();
        cache.set("k", &1).unwrap();
        cache.set("k", &2).unwrap();
        assert_eq!(cache.get::<i32>("k").unwrap(), Some(2));
    }

    #[test]
    fn test_clear_only_touches_namespace() {
        let dir = TempDir::new().unwrap();
        let ours = CacheManager::new(dir.path().to_path_buf()).unwrap();
        let theirs =
            CacheManager::with_settings(dir.path().to_path_buf(), "other_", Duration::minutes(3))
                .unwrap();
        std::fs::write(dir.path().join("session.json"), "{}").unwrap();

        ours.set("a", &1).unwrap();
        ours.set("b/c", &2).unwrap();
        theirs.set("a", &3).unwrap();

        assert_eq!(ours.keys().unwrap(), vec!["a".to_string(), "b/c".to_string()]);
        assert_eq!(ours.clear().unwrap(), 2);
        assert!(ours.keys().unwrap().is_empty());
        assert_eq!(theirs.get::<i32>("a").unwrap(), Some(3));
        assert!(dir.path().join("session.json").exists());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let (_dir, cache) = cache();
        std::fs::write(cache.entry_path("bad"), "not json").unwrap();
        assert!(cache.get::<i32>("bad").unwrap().is_none());
        assert!(!cache.entry_path("bad").exists());
    }

    #[test]
    fn test_age_display() {
        let mut cached = CachedData::new(());
        assert_eq!(cached.age_display(), "just now");
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.cached_at = Utc::now() - Duration::hours(3);
        assert_eq!(cached.age_display(), "3h ago");
    }

    #[tokio::test]
    async fn test_fetch_cached_only_fetches_once() {
        let (_dir, cache) = cache();
        let mut fetches = 0;

        for _ in 0..3 {
            let rows: Vec<i32> = cache
                .fetch_cached("categories?restaurant_id=eq.r-1", || {
                    fetches += 1;
                    async { Ok(vec![7]) }
                })
                .await
                .unwrap();
            assert_eq!(rows, vec![7]);
        }

        assert_eq!(fetches, 1);
        assert_eq!(
            cache.keys().unwrap(),
            vec!["categories?restaurant_id=eq.r-1_GET".to_string()]
        );
    }

    #[tokio::test]
    async fn test_fetch_cached_does_not_store_errors() {
        let (_dir, cache) = cache();
        let result: Result<Vec<i32>, ApiError> = cache
            .fetch_cached("users", || async { Err(ApiError::Unauthorized) })
            .await;
        assert!(result.is_err());
        assert!(cache.keys().unwrap().is_empty());
    }
}
