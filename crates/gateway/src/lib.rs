//! HTTP API gateway for Codeward.
//!
//! Serves the context engine over a small JSON API: a health probe plus
//! the v1 routes in [`api_v1`]. The engine is built once at startup and
//! shared by every request.

pub mod api_v1;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use codeward_context::ContextEngine;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request bodies carry a description and a few paths; 64 KiB is plenty.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub type SharedState = Arc<ContextEngine>;

/// Build the full router: `/health` and the v1 API under `/v1`.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Start the gateway server and block until it stops.
pub async fn start(config: codeward_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let engine = Arc::new(ContextEngine::from_config(&config));
    let app = build_router(engine);

    info!(
        address = %addr,
        data_dir = %config.data_dir.display(),
        default_profile = %config.profiles.default_profile,
        "Starting Codeward gateway"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use codeward_config::AppConfig;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state() -> (TempDir, SharedState) {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        (tmp, Arc::new(ContextEngine::from_config(&config)))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (_tmp, state) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.status, "ok");
        assert_eq!(json.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn v1_routes_are_nested() {
        let (_tmp, state) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(Request::builder().uri("/v1/standards/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (_tmp, state) = test_state();
        let app = build_router(state);

        let description = "x".repeat(MAX_BODY_BYTES + 1);
        let body = serde_json::json!({ "description": description }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/classify")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (_tmp, state) = test_state();
        let response = build_router(state)
            .oneshot(Request::builder().uri("/v2/context").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
