//! Edge proxy for public menus.
//!
//! Serves `GET /menu?restaurant_id={id}` from an in-memory cache, falling
//! back to the backend's `menu` view. Responses carry
//! `Cache-Control: public, max-age={max_age}` so browsers and CDNs can hold
//! them for the same window.
//!
//! # Configuration
//!
//! - `MENUBOARD_SUPABASE_URL`, `MENUBOARD_SUPABASE_KEY`: backend project (required)
//! - `MENUBOARD_EDGE_PORT`: listen port, default 8787
//! - `MENUBOARD_EDGE_MAX_AGE`: cache lifetime in seconds, default 300
//! - `RUST_LOG`: log filter

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{health_handler, menu_handler};
use state::State;

pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/menu", get(menu_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading configuration...");
    let config = Config::load()?;
    let state = State::from_config(&config)?;

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Edge proxy running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Edge proxy shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CACHE_CONTROL, Request, StatusCode},
    };
    use httpmock::prelude::*;
    use menuboard_core::api::{RestClient, RetryPolicy};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state_for(server: &MockServer, max_age: Duration) -> Arc<State> {
        let client = RestClient::new(&server.base_url(), "anon-key")
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        State::new(client, max_age)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    // -------------------------------------------------------------------------
    // /menu
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_missing_restaurant_id_is_400() {
        let server = MockServer::start();
        let state = state_for(&server, Duration::from_secs(300));

        for uri in ["/menu", "/menu?restaurant_id="] {
            let (status, _, body) = get(app(state.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body, json!({ "error": "Missing restaurant_id" }));
        }
    }

    #[tokio::test]
    async fn test_menu_is_fetched_once_and_cached() {
        let server = MockServer::start();
        let upstream = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/menu")
                .query_param("restaurant_id", "eq.r-1")
                .query_param("select", "*")
                .header("apikey", "anon-key")
                .header("Authorization", "Bearer anon-key");
            then.status(200).body(r#"[{"id":"p-1"}]"#);
        });
        let state = state_for(&server, Duration::from_secs(300));

        let (status, headers, body) = get(app(state.clone()), "/menu?restaurant_id=r-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"[{"id":"p-1"}]"#);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=300");

        let (status, _, body) = get(app(state), "/menu?restaurant_id=r-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"[{"id":"p-1"}]"#);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_entries_are_refetched() {
        let server = MockServer::start();
        let upstream = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/menu");
            then.status(200).body("[]");
        });
        let state = state_for(&server, Duration::ZERO);

        get(app(state.clone()), "/menu?restaurant_id=r-1").await;
        get(app(state), "/menu?restaurant_id=r-1").await;
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through_uncached() {
        let server = MockServer::start();
        let upstream = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/menu");
            then.status(404).body(r#"{"message":"relation not found"}"#);
        });
        let state = state_for(&server, Duration::from_secs(300));

        let (status, headers, body) = get(app(state.clone()), "/menu?restaurant_id=r-1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(body.contains("relation not found"));

        get(app(state), "/menu?restaurant_id=r-1").await;
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_502() {
        let client = RestClient::new("http://127.0.0.1:1", "anon-key")
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        let state = State::new(client, Duration::from_secs(300));

        let (status, _, body) = get(app(state), "/menu?restaurant_id=r-1").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Upstream unavailable"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start();
        let (status, _, body) = get(app(state_for(&server, Duration::from_secs(1))), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
