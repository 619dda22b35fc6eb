//! Offline support for the public menu site.
//!
//! Requests are classified by `policy::classify` into bypass, network-only,
//! network-first and cache-first. `OfflineWorker` applies the strategy
//! against a `ResponseStore` of named on-disk caches and pre-caches the
//! site's static assets on install.

pub mod policy;
pub mod store;
pub mod worker;

pub use policy::{classify, Strategy};
pub use store::{CachedResponse, NamedCache, ResponseStore};
pub use worker::{
    static_urls, Fetcher, Handled, InstallReport, OfflineWorker, ReqwestFetcher, Source, CACHE_NAME,
    OPTIONAL_URLS, STATIC_ASSETS,
};
