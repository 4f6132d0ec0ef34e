//! Deploy stage
//!
//! Applies the declarative desired state for the pushed artifact: a
//! deployment with the standard replica count and a load-balanced service
//! in front of it. The stage reports success once the control plane
//! accepts the desired state; rollout completion is not awaited, and a
//! failed apply never rolls back an earlier deployment.

use async_trait::async_trait;
use gantry_core::domain::{DeploymentSpec, StageError, StageName, StageResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::stage::{PipelineStage, RunContext};

/// Cluster control plane boundary.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Applies the rendered desired state. May block on network I/O.
    async fn apply(&self, manifest: &Value) -> Result<(), StageError>;
}

/// Applies the deployment spec for the published artifact.
pub struct DeployStage {
    cluster: Arc<dyn ClusterClient>,
    deployment_name: String,
    image_pull_secret: Option<String>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl DeployStage {
    pub fn new(cluster: Arc<dyn ClusterClient>, config: &Config) -> Self {
        Self {
            cluster,
            deployment_name: config.deployment_name.clone(),
            image_pull_secret: config.image_pull_secret.clone(),
            retry: RetryPolicy::new(
                config.apply_max_retries,
                config.retry_initial_backoff,
                config.retry_max_backoff,
            ),
            timeout: config.network_timeout,
        }
    }
}

#[async_trait]
impl PipelineStage for DeployStage {
    fn name(&self) -> StageName {
        StageName::Deploy
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn run(&self, ctx: &RunContext) -> StageResult {
        let Some(artifact) = &ctx.artifact else {
            return StageResult::failure(StageError::ApplyFailure(
                "no artifact available to deploy".to_string(),
            ));
        };

        let Some(image) = &artifact.pushed_ref else {
            return StageResult::failure(StageError::ApplyFailure(
                "artifact was never pushed to the registry".to_string(),
            ));
        };

        let mut spec = DeploymentSpec::new(&self.deployment_name, image);
        if let Some(secret) = &self.image_pull_secret {
            spec = spec.with_image_pull_secret(secret);
        }

        // ManifestInvalid is fatal; it never reaches the retry loop.
        let manifest = match spec.render() {
            Ok(manifest) => manifest,
            Err(e) => return StageResult::failure(e),
        };

        info!(
            "Applying desired state: {} replicas of {}, service port {} -> {}",
            spec.replicas, spec.image, spec.service_port, spec.container_port
        );

        match tokio::time::timeout(self.timeout, self.cluster.apply(&manifest)).await {
            Ok(Ok(())) => {
                info!("Desired state accepted by the cluster");
                StageResult::success()
            }
            Ok(Err(e)) => StageResult::failure(e),
            Err(_) => StageResult::failure(StageError::ApplyFailure(format!(
                "apply timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
