//! HTTP client for the REST-over-tables backend.
//!
//! Every request carries the project API key twice (as `apikey` and as a
//! bearer token), is bounded by a per-attempt timeout, and is retried on
//! timeouts and connection failures according to a `RetryPolicy`.

use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use super::query::{Query, Resource};
use super::retry::{self, RetryPolicy};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Per-attempt request timeout in milliseconds.
/// 15s tolerates cold starts on the hosted backend.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Path prefix for table endpoints
const REST_PATH: &str = "rest/v1";

/// Path prefix for storage objects
const STORAGE_PATH: &str = "storage/v1/object";

/// Header carrying the project API key
const APIKEY_HEADER: &str = "apikey";

/// Asks the backend to echo written rows back in the response body
const PREFER_REPRESENTATION: &str = "return=representation";

/// Raw upstream response, for callers that relay it unchanged.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Client for the table API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RestClient {
    /// Create a new client for the project at `base_url`
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, resource: Resource, query: &Query) -> Result<String, ApiError> {
        let rendered = query.render(resource)?;
        if rendered.is_empty() {
            Ok(format!("{}/{}/{}", self.base_url, REST_PATH, resource.table()))
        } else {
            Ok(format!(
                "{}/{}/{}?{}",
                self.base_url,
                REST_PATH,
                resource.table(),
                rendered
            ))
        }
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            STORAGE_PATH,
            bucket,
            urlencoding::encode(name)
        )
    }

    /// Public URL of a stored object
    pub fn object_public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/{}/public/{}/{}",
            self.base_url,
            STORAGE_PATH,
            bucket,
            urlencoding::encode(name)
        )
    }

    fn default_headers(&self, method: &Method) -> Result<header::HeaderMap, ApiError> {
        let invalid = |e: header::InvalidHeaderValue| ApiError::InvalidRequest(e.to_string());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            APIKEY_HEADER,
            header::HeaderValue::from_str(&self.api_key).map_err(invalid)?,
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(invalid)?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if *method == Method::POST || *method == Method::PATCH {
            headers.insert(
                "prefer",
                header::HeaderValue::from_static(PREFER_REPRESENTATION),
            );
        }
        Ok(headers)
    }

    /// Map a transport error for attempt number `attempt` (zero-based).
    fn classify(err: reqwest::Error, attempt: u32) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                attempts: attempt + 1,
            }
        } else {
            ApiError::Network(err)
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        attempt: u32,
    ) -> Result<Response, ApiError> {
        debug!(%method, url, attempt, "Sending request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .headers(self.default_headers(&method)?)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| Self::classify(e, attempt))
    }

    async fn read_body(response: Response, attempt: u32) -> Result<(StatusCode, String), ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::classify(e, attempt))?;
        Ok((status, text))
    }

    /// Decode a response body. Empty bodies and undecodable 201/204 bodies
    /// decode to None.
    fn decode_body(status: StatusCode, text: &str) -> Result<Option<Value>, ApiError> {
        if !status.is_success() {
            return Err(ApiError::from_status(status, text));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(text) {
            Ok(value) => Ok(Some(value)),
            Err(_) if status == StatusCode::CREATED || status == StatusCode::NO_CONTENT => Ok(None),
            Err(e) => Err(ApiError::InvalidJson(e.to_string())),
        }
    }

    async fn request_url(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        retry::run(&self.retry, url, |attempt| {
            let method = method.clone();
            async move {
                let response = self.send_once(method, url, body, attempt).await?;
                let (status, text) = Self::read_body(response, attempt).await?;
                Self::decode_body(status, &text)
            }
        })
        .await
    }

    /// Perform a request against a table and return the decoded body, if any.
    pub async fn request(
        &self,
        method: Method,
        resource: Resource,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.table_url(resource, query)?;
        self.request_url(method, &url, body).await
    }

    /// GET a table and return the raw status and body without mapping errors.
    /// Timeouts and connection failures are still retried.
    pub async fn fetch_raw(&self, resource: Resource, query: &Query) -> Result<RawResponse, ApiError> {
        let url = self.table_url(resource, query)?;
        let url = url.as_str();
        retry::run(&self.retry, url, |attempt| async move {
            let response = self.send_once(Method::GET, url, None, attempt).await?;
            let (status, body) = Self::read_body(response, attempt).await?;
            Ok(RawResponse { status, body })
        })
        .await
    }

    /// Decode a body into rows. Objects become a single row; no body means no rows.
    fn decode_rows<T: DeserializeOwned>(value: Option<Value>) -> Result<Vec<T>, ApiError> {
        let rows = match value {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
        };
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| ApiError::InvalidJson(e.to_string())))
            .collect()
    }

    fn encode_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, query: &Query) -> Result<Vec<T>, ApiError> {
        let value = self.request(Method::GET, resource, query, None).await?;
        Self::decode_rows(value)
    }

    /// Insert a row and return the created rows
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<Vec<T>, ApiError> {
        let body = Self::encode_body(body)?;
        let value = self
            .request(Method::POST, resource, &Query::new(), Some(&body))
            .await?;
        Self::decode_rows(value)
    }

    /// Update rows matching `query` and return them
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        resource: Resource,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>, ApiError> {
        let body = Self::encode_body(body)?;
        let value = self
            .request(Method::PATCH, resource, query, Some(&body))
            .await?;
        Self::decode_rows(value)
    }

    pub async fn delete(&self, resource: Resource, query: &Query) -> Result<(), ApiError> {
        self.request(Method::DELETE, resource, query, None).await?;
        Ok(())
    }

    /// Delete an object from a storage bucket
    pub async fn delete_object(&self, bucket: &str, name: &str) -> Result<(), ApiError> {
        let url = self.object_url(bucket, name);
        self.request_url(Method::DELETE, &url, None).await?;
        Ok(())
    }
}
