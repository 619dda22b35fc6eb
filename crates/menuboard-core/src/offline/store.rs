//! Named on-disk response caches.
//!
//! Layout: `{root}/{cache_name}/{sha256(url)}.json`. Each file holds the
//! URL and the stored response; bodies are hex-encoded so binary assets
//! survive the JSON round trip.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// A stored (or synthesized) HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(with = "hex_body")]
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

mod hex_body {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    url: String,
    response: CachedResponse,
}

fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// One named cache directory.
#[derive(Debug, Clone)]
pub struct NamedCache {
    name: String,
    dir: PathBuf,
}

impl NamedCache {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", url_digest(url)))
    }

    pub fn match_url(&self, url: &str) -> Result<Option<CachedResponse>> {
        let path = self.entry_path(url);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str::<StoredEntry>(&contents) {
            Ok(entry) if entry.url == url => Ok(Some(entry.response)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(url, error = %e, "Dropping unreadable cached response");
                discard(&path);
                Ok(None)
            }
        }
    }

    pub fn put(&self, url: &str, response: &CachedResponse) -> Result<()> {
        let entry = StoredEntry {
            url: url.to_string(),
            response: response.clone(),
        };
        let contents = serde_json::to_string(&entry)?;
        std::fs::write(self.entry_path(url), contents)?;
        debug!(cache = %self.name, url, "Stored response");
        Ok(())
    }
}

/// Best-effort removal of a bad entry; a failure is logged and the entry
/// stays a miss.
fn discard(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove cached response");
            false
        }
    }
}

/// The set of named caches under one root directory.
#[derive(Debug, Clone)]
pub struct ResponseStore {
    root: PathBuf,
}

impl ResponseStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Open a cache, creating it if needed
    pub fn open(&self, name: &str) -> Result<NamedCache> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache {}", dir.display()))?;
        Ok(NamedCache {
            name: name.to_string(),
            dir,
        })
    }

    pub fn cache_names(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a cache. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to delete cache {}", dir.display()))?;
        Ok(true)
    }

    /// Look `url` up in every cache, in name order
    pub fn match_url(&self, url: &str) -> Result<Option<CachedResponse>> {
        for name in self.cache_names()? {
            if let Some(response) = self.open(&name)?.match_url(url)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_match() {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        let cache = store.open("menuboard-v2").unwrap();

        let response = CachedResponse::new(200, vec![0u8, 159, 146, 150]).with_header("Content-Type", "image/png");
        cache.put("https://menu.example/logo.png", &response).unwrap();

        let found = cache.match_url("https://menu.example/logo.png").unwrap().unwrap();
        assert_eq!(found, response);
        assert_eq!(found.header("content-type"), Some("image/png"));
        assert!(cache.match_url("https://menu.example/other.png").unwrap().is_none());

        let path = dir
            .path()
            .join("menuboard-v2")
            .join(format!("{}.json", url_digest("https://menu.example/logo.png")));
        assert!(path.exists());
    }

    #[test]
    fn test_cache_names_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        store.open("b-cache").unwrap();
        store.open("a-cache").unwrap();
        assert_eq!(store.cache_names().unwrap(), vec!["a-cache", "b-cache"]);

        assert!(store.delete("a-cache").unwrap());
        assert!(!store.delete("a-cache").unwrap());
        assert_eq!(store.cache_names().unwrap(), vec!["b-cache"]);
    }

    #[test]
    fn test_store_wide_match_searches_every_cache() {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        store
            .open("old")
            .unwrap()
            .put("https://menu.example/", &CachedResponse::new(200, "home"))
            .unwrap();
        store.open("new").unwrap();

        let found = store.match_url("https://menu.example/").unwrap().unwrap();
        assert_eq!(found.text(), "home");
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let store = ResponseStore::new(dir.path());
        let cache = store.open("c").unwrap();
        let url = "https://menu.example/x.js";
        std::fs::write(cache.entry_path(url), "not json").unwrap();
        assert!(cache.match_url(url).unwrap().is_none());
        assert!(!cache.entry_path(url).exists());
    }

    #[test]
    fn test_discard_failure_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.json");
        assert!(!discard(&path));

        std::fs::write(&path, "x").unwrap();
        assert!(discard(&path));
        assert!(!path.exists());
    }
}
