//! Offline request handling: pre-caching, cache cleanup, and per-request
//! strategies backed by a `ResponseStore`.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, info, warn};

use crate::api::ApiError;

use super::policy::{classify, Strategy, FETCH_TIMEOUT, NETWORK_ONLY_TIMEOUT};
use super::store::{CachedResponse, ResponseStore};

/// Current cache generation; any other cache is removed on activation
pub const CACHE_NAME: &str = "menuboard-v2";

/// Pages and scripts every install must cache, relative to the site root
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/login.html",
    "/admin.html",
    "/menu.html",
    "/config.js",
    "/performance-cache.js",
    "/database.js",
];

/// Third-party assets cached when reachable
pub const OPTIONAL_URLS: &[&str] = &[
    "https://unpkg.com/swiper/swiper-bundle.min.css",
    "https://unpkg.com/swiper/swiper-bundle.min.js",
    "https://cdn.tailwindcss.com",
];

const OPTIONAL_TIMEOUT: Duration = Duration::from_secs(5);

const NETWORK_UNAVAILABLE: &str = "Network unavailable";
const NOT_CACHED: &str = "Offline - Resource not cached";
const SERVICE_UNAVAILABLE: u16 = 503;

/// Absolute URLs for `STATIC_ASSETS` under `origin`
pub fn static_urls(origin: &str) -> Vec<String> {
    let origin = origin.trim_end_matches('/');
    STATIC_ASSETS
        .iter()
        .map(|path| format!("{}{}", origin, path))
        .collect()
}

/// Something that can GET a URL within a time limit.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<CachedResponse, ApiError>;
}

/// `Fetcher` over a shared reqwest client.
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<CachedResponse, ApiError> {
        let to_api_error = |e: reqwest::Error| {
            if e.is_timeout() {
                ApiError::Timeout { attempts: 1 }
            } else {
                ApiError::Network(e)
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(to_api_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(to_api_error)?.to_vec();

        Ok(CachedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Where a handled response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
    /// Synthesized 503 because neither network nor cache could answer
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    /// The worker does not handle this request
    Bypass,
    Respond { response: CachedResponse, source: Source },
}

impl Handled {
    fn network(response: CachedResponse) -> Self {
        Handled::Respond {
            response,
            source: Source::Network,
        }
    }

    fn cache(response: CachedResponse) -> Self {
        Handled::Respond {
            response,
            source: Source::Cache,
        }
    }

    fn fallback(response: CachedResponse) -> Self {
        Handled::Respond {
            response,
            source: Source::Fallback,
        }
    }

    pub fn response(&self) -> Option<&CachedResponse> {
        match self {
            Handled::Bypass => None,
            Handled::Respond { response, .. } => Some(response),
        }
    }
}

/// Outcome of `OfflineWorker::install`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub cached: usize,
    pub skipped: Vec<String>,
}

pub struct OfflineWorker<F: Fetcher> {
    store: ResponseStore,
    cache_name: String,
    fetcher: F,
}

impl<F: Fetcher> OfflineWorker<F> {
    pub fn new(store: ResponseStore, fetcher: F) -> Self {
        Self {
            store,
            cache_name: CACHE_NAME.to_string(),
            fetcher,
        }
    }

    pub fn with_cache_name(mut self, name: &str) -> Self {
        self.cache_name = name.to_string();
        self
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Cache `static_urls` (all must succeed or nothing is stored), then
    /// `optional_urls` best-effort.
    pub async fn install(&self, static_urls: &[String], optional_urls: &[String]) -> Result<InstallReport> {
        info!(cache = %self.cache_name, "Installing offline cache");
        let cache = self.store.open(&self.cache_name)?;

        let fetches = static_urls.iter().map(|url| self.fetcher.fetch(url, FETCH_TIMEOUT));
        let results = futures::future::join_all(fetches).await;

        let mut fetched = Vec::with_capacity(static_urls.len());
        for (url, result) in static_urls.iter().zip(results) {
            let response = result.with_context(|| format!("Failed to fetch {}", url))?;
            if !response.is_ok() {
                bail!("Failed to fetch {}: status {}", url, response.status);
            }
            fetched.push((url, response));
        }
        for (url, response) in &fetched {
            cache.put(url, response)?;
        }

        let mut report = InstallReport {
            cached: fetched.len(),
            skipped: Vec::new(),
        };
        let fetches = optional_urls.iter().map(|url| self.fetcher.fetch(url, OPTIONAL_TIMEOUT));
        let results = futures::future::join_all(fetches).await;

        for (url, result) in optional_urls.iter().zip(results) {
            match result {
                Ok(response) if response.is_ok() => match cache.put(url, &response) {
                    Ok(()) => report.cached += 1,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Optional cache write failed");
                        report.skipped.push(url.clone());
                    }
                },
                Ok(response) => {
                    warn!(url = %url, status = response.status, "Optional cache skipped");
                    report.skipped.push(url.clone());
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Optional cache skipped");
                    report.skipped.push(url.clone());
                }
            }
        }
        Ok(report)
    }

    /// Delete every cache except the current one. Returns the deleted names.
    pub fn activate(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.store.cache_names()? {
            if name != self.cache_name {
                info!(cache = %name, "Deleting old cache");
                self.store.delete(&name)?;
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    pub async fn handle(&self, method: &Method, url: &str) -> Handled {
        match classify(method, url) {
            Strategy::Bypass => Handled::Bypass,
            Strategy::NetworkOnly => self.network_only(url).await,
            Strategy::NetworkFirst => self.network_first(url).await,
            Strategy::CacheFirst => self.cache_first(url).await,
        }
    }

    fn lookup(&self, url: &str) -> Option<CachedResponse> {
        match self.store.match_url(url) {
            Ok(found) => found,
            Err(e) => {
                warn!(url, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    fn remember(&self, url: &str, response: &CachedResponse) {
        if !response.is_ok() {
            return;
        }
        let result = self
            .store
            .open(&self.cache_name)
            .and_then(|cache| cache.put(url, response));
        if let Err(e) = result {
            warn!(url, error = %e, "Cache write failed");
        }
    }

    async fn network_only(&self, url: &str) -> Handled {
        match self.fetcher.fetch(url, NETWORK_ONLY_TIMEOUT).await {
            Ok(response) => Handled::network(response),
            Err(e) => {
                warn!(url, error = %e, "Network request failed");
                Handled::fallback(CachedResponse::new(SERVICE_UNAVAILABLE, NETWORK_UNAVAILABLE))
            }
        }
    }

    async fn network_first(&self, url: &str) -> Handled {
        match self.fetcher.fetch(url, FETCH_TIMEOUT).await {
            Ok(response) => {
                self.remember(url, &response);
                Handled::network(response)
            }
            Err(e) => {
                debug!(url, error = %e, "Network failed, trying cache");
                match self.lookup(url) {
                    Some(cached) => Handled::cache(cached),
                    None => Handled::fallback(
                        CachedResponse::new(SERVICE_UNAVAILABLE, r#"{"error":"Offline"}"#)
                            .with_header("Content-Type", "application/json"),
                    ),
                }
            }
        }
    }

    async fn cache_first(&self, url: &str) -> Handled {
        if let Some(cached) = self.lookup(url) {
            debug!(url, "Serving from cache");
            return Handled::cache(cached);
        }
        match self.fetcher.fetch(url, FETCH_TIMEOUT).await {
            Ok(response) => {
                self.remember(url, &response);
                Handled::network(response)
            }
            Err(e) => {
                warn!(url, error = %e, "Fetch failed with nothing cached");
                Handled::fallback(CachedResponse::new(SERVICE_UNAVAILABLE, NOT_CACHED))
            }
        }
    }
}
