use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Payload too large - reduce image sizes and try again")]
    PayloadTooLarge,

    #[error("Unauthorized - check the API key")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Marker the backend puts in oversized-request error bodies
const PAYLOAD_TOO_LARGE_MARKER: &str = "payload too large";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE
            || body.to_lowercase().contains(PAYLOAD_TOO_LARGE_MARKER)
        {
            return ApiError::PayloadTooLarge;
        }

        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(truncated),
            code => ApiError::Http {
                status: code,
                body: truncated,
            },
        }
    }

    /// Short message suitable for a status bar toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout { .. } => "Server is not responding. Please try again.".to_string(),
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::PayloadTooLarge => {
                "Data too large - use smaller images or image links".to_string()
            }
            ApiError::Validation(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_payload_too_large_by_status() {
        let err = ApiError::from_status(StatusCode::PAYLOAD_TOO_LARGE, "");
        assert!(matches!(err, ApiError::PayloadTooLarge));
    }

    #[test]
    fn test_from_status_payload_too_large_by_body() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Payload too large"}"#,
        );
        assert!(matches!(err, ApiError::PayloadTooLarge));
    }

    #[test]
    fn test_from_status_generic() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "bad filter");
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad filter");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "ق".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
