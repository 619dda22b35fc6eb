use std::time::Duration;

use reqwest::Method;

/// Hosts whose responses are never cached
pub const NETWORK_ONLY_HOSTS: &[&str] = &["cdn.tailwindcss.com", "cdn.jsdelivr.net"];

/// Markers of data API traffic, which the offline layer never touches
const BYPASS_MARKERS: &[&str] = &["supabase.co", "rest/v1/"];

pub const NETWORK_ONLY_TIMEOUT: Duration = Duration::from_secs(10);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// How a request is served when offline support is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Not handled; goes straight to the network
    Bypass,
    NetworkOnly,
    NetworkFirst,
    CacheFirst,
}

impl Strategy {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Strategy::Bypass => None,
            Strategy::NetworkOnly => Some(NETWORK_ONLY_TIMEOUT),
            Strategy::NetworkFirst | Strategy::CacheFirst => Some(FETCH_TIMEOUT),
        }
    }
}

/// Pick a strategy from the method and URL. Rules are checked in order:
/// non-GET, data API, CDN host, `api` anywhere in the URL, everything else.
pub fn classify(method: &Method, url: &str) -> Strategy {
    if *method != Method::GET {
        return Strategy::Bypass;
    }
    if BYPASS_MARKERS.iter().any(|m| url.contains(m)) {
        return Strategy::Bypass;
    }
    if NETWORK_ONLY_HOSTS.iter().any(|h| url.contains(h)) {
        return Strategy::NetworkOnly;
    }
    if url.contains("api") {
        Strategy::NetworkFirst
    } else {
        Strategy::CacheFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let get = Method::GET;
        assert_eq!(classify(&Method::POST, "https://menu.example/menu.html"), Strategy::Bypass);
        assert_eq!(classify(&get, "https://abc.supabase.co/anything"), Strategy::Bypass);
        assert_eq!(classify(&get, "https://self-hosted.example/rest/v1/products"), Strategy::Bypass);
        assert_eq!(classify(&get, "https://cdn.tailwindcss.com"), Strategy::NetworkOnly);
        assert_eq!(classify(&get, "https://cdn.jsdelivr.net/npm/x.js"), Strategy::NetworkOnly);
        assert_eq!(classify(&get, "https://menu.example/api/menu"), Strategy::NetworkFirst);
        assert_eq!(classify(&get, "https://menu.example/menu.html"), Strategy::CacheFirst);
    }

    #[test]
    fn test_data_api_wins_over_api_marker() {
        assert_eq!(
            classify(&Method::GET, "https://api.supabase.co/rest/v1/menu"),
            Strategy::Bypass
        );
    }

    #[test]
    fn test_timeouts() {
        assert_eq!(Strategy::NetworkOnly.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(Strategy::CacheFirst.timeout(), Some(Duration::from_secs(8)));
        assert_eq!(Strategy::Bypass.timeout(), None);
    }
}
