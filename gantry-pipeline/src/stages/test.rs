//! Test stage
//!
//! Gates the pipeline on the service's unit suite: probes both routes
//! in-process and verifies status and payload shape for each. Assertion
//! failures are collected and reported as a single `TestFailure`; nothing
//! is thrown past the orchestrator boundary.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gantry_core::domain::{StageError, StageName, StageResult};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::{debug, info};

use crate::stage::{PipelineStage, RunContext};

/// Runs the service checks against an axum router.
pub struct TestStage {
    router: Router,
}

impl TestStage {
    /// Tests the bundled sample application.
    pub fn new() -> Self {
        Self {
            router: gantry_app::router(),
        }
    }

    /// Tests an arbitrary router. Used to exercise failure paths.
    pub fn with_router(router: Router) -> Self {
        Self { router }
    }

    /// Sends one request through the router and decodes the JSON body.
    async fn probe(&self, path: &str) -> Result<(StatusCode, Value), String> {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .map_err(|e| format!("failed to build request for {}: {}", path, e))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| format!("request to {} failed: {}", path, e))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| format!("failed to read body from {}: {}", path, e))?
            .to_bytes();

        let body = serde_json::from_slice(&bytes)
            .map_err(|e| format!("non-JSON body from {}: {}", path, e))?;

        Ok((status, body))
    }
}

impl Default for TestStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStage for TestStage {
    fn name(&self) -> StageName {
        StageName::Test
    }

    async fn run(&self, _ctx: &RunContext) -> StageResult {
        let mut failures = Vec::new();

        debug!("Checking root greeting route");
        match self.probe("/").await {
            Ok((status, body)) => {
                if status != StatusCode::OK {
                    failures.push(format!(
                        "read_root: expected status 200, got {}",
                        status.as_u16()
                    ));
                } else if body.get("Hello").is_none() {
                    failures.push("read_root: greeting payload missing 'Hello' field".to_string());
                }
            }
            Err(e) => failures.push(format!("read_root: {}", e)),
        }

        debug!("Checking health route");
        match self.probe("/health").await {
            Ok((status, body)) => {
                if status != StatusCode::OK {
                    failures.push(format!(
                        "health_check: expected status 200, got {}",
                        status.as_u16()
                    ));
                } else if body.get("status") != Some(&json!("healthy")) {
                    failures.push("health_check: payload does not report 'healthy'".to_string());
                }
            }
            Err(e) => failures.push(format!("health_check: {}", e)),
        }

        if failures.is_empty() {
            info!("All service checks passed");
            StageResult::success()
        } else {
            StageResult::failure(StageError::TestFailure(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use gantry_core::domain::Revision;

    fn ctx() -> RunContext {
        RunContext::new(Revision::new("abc123").unwrap())
    }

    #[tokio::test]
    async fn test_bundled_app_passes() {
        let result = TestStage::new().run(&ctx()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_unhealthy_service_fails_with_check_name() {
        let router = Router::new()
            .route("/", get(gantry_app::api::root))
            .route(
                "/health",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(json!({ "status": "unhealthy" })),
                    )
                }),
            );

        let result = TestStage::with_router(router).run(&ctx()).await;
        assert!(!result.is_success());

        let Some(StageError::TestFailure(message)) = result.error else {
            panic!("expected a test failure");
        };
        assert!(message.contains("health_check"));
        assert!(message.contains("500"));
        assert!(!message.contains("read_root"));
    }

    #[tokio::test]
    async fn test_missing_route_reported() {
        let router = Router::new().route("/", get(gantry_app::api::root));

        let result = TestStage::with_router(router).run(&ctx()).await;
        assert!(!result.is_success());

        let Some(StageError::TestFailure(message)) = result.error else {
            panic!("expected a test failure");
        };
        assert!(message.contains("health_check"));
    }

    #[tokio::test]
    async fn test_wrong_payload_shape_reported() {
        let router = Router::new()
            .route("/", get(|| async { axum::Json(json!({ "Goodbye": "x" })) }))
            .route("/health", get(gantry_app::api::health_check));

        let result = TestStage::with_router(router).run(&ctx()).await;
        assert!(!result.is_success());

        let Some(StageError::TestFailure(message)) = result.error else {
            panic!("expected a test failure");
        };
        assert!(message.contains("read_root"));
        assert!(message.contains("Hello"));
    }
}
