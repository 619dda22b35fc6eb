//! REST client module for the table backend.
//!
//! This module provides the `RestClient` for reading and writing
//! tenant data, a typed `Query` builder validated per `Resource`,
//! and the `RetryPolicy` applied to timeouts and connection failures.
//!
//! The backend authenticates every call with the project API key,
//! sent both as an `apikey` header and as a bearer token.

pub mod client;
pub mod error;
pub mod query;
pub mod retry;

pub use client::{RawResponse, RestClient, DEFAULT_TIMEOUT_MS};
pub use error::ApiError;
pub use query::{Direction, Query, Resource};
pub use retry::{FailureKind, RetryPolicy};
