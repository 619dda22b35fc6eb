//! Core library for menuboard.
//!
//! Shared by the terminal dashboard and the edge proxy:
//!
//! - `api`: REST-over-tables client with timeout retry and typed queries
//! - `auth`: sessions, roles, password hashing and keyring credentials
//! - `cache`: namespaced on-disk cache with a fixed time-to-live
//! - `config`: persisted application configuration
//! - `menu`: category/section/product grouping and menu filters
//! - `models`: table row types
//! - `offline`: cache-first/network-first asset handling
//! - `store`: tenant-scoped data operations
//! - `utils`: formatting helpers

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod menu;
pub mod models;
pub mod offline;
pub mod store;
pub mod utils;
