use std::sync::Arc;

use axum::{
    extract::{Query, State as AxumState},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use menuboard_core::api::{Query as TableQuery, Resource};
use serde::Deserialize;
use tracing::{debug, info};

use super::{error::EdgeError, state::State};

#[derive(Debug, Deserialize)]
pub struct MenuParams {
    restaurant_id: Option<String>,
}

fn menu_response(state: &State, status: StatusCode, body: String) -> Response {
    let cache_control = format!("public, max-age={}", state.max_age.as_secs());
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }
    response
}

pub async fn menu_handler(
    AxumState(state): AxumState<Arc<State>>,
    Query(params): Query<MenuParams>,
) -> Result<Response, EdgeError> {
    let restaurant_id = params
        .restaurant_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(EdgeError::MissingRestaurantId)?;

    if let Some(body) = state.fresh_menu(&restaurant_id).await {
        debug!(restaurant_id = %restaurant_id, "Menu cache hit");
        return Ok(menu_response(&state, StatusCode::OK, body));
    }

    let query = TableQuery::new()
        .eq("restaurant_id", &restaurant_id)
        .select(&["*"]);
    let upstream = state.client.fetch_raw(Resource::Menu, &query).await?;

    info!(restaurant_id = %restaurant_id, status = %upstream.status, "Fetched menu from upstream");
    if upstream.status.is_success() {
        state.store_menu(&restaurant_id, &upstream.body).await;
    }

    let status = StatusCode::from_u16(upstream.status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(menu_response(&state, status, upstream.body))
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
