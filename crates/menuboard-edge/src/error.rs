use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use menuboard_core::api::ApiError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("Missing restaurant_id")]
    MissingRestaurantId,

    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] ApiError),
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = match self {
            EdgeError::MissingRestaurantId => StatusCode::BAD_REQUEST,
            EdgeError::Upstream(ApiError::UnknownColumn { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            EdgeError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
