//! Local caching module for repeated reads.
//!
//! This module provides the `CacheManager`, a namespaced key/value store
//! backed by JSON files. Entries expire a fixed time after they were
//! written (3 minutes by default) and are evicted when read after that.
//!
//! GET requests are cached under `{endpoint}_GET` keys via
//! `CacheManager::fetch_cached`.

pub mod manager;

pub use manager::{CacheManager, CachedData, DEFAULT_NAMESPACE, DEFAULT_TTL_MINUTES};
