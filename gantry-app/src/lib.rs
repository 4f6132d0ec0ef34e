//! Gantry sample application
//!
//! The minimal HTTP service delivered by the pipeline:
//! - `GET /` -> greeting payload
//! - `GET /health` -> health payload
//!
//! The service itself is deliberately trivial; the interesting part of the
//! repository is the pipeline that tests, builds, publishes and deploys it.

pub mod api;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Port the service listens on inside its container.
pub const APP_PORT: u16 = 8000;

/// Builds the application router with all routes.
pub fn router() -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_json(path: &str) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_read_root() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "Hello": "DevOps Learner" }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
