//! Publish stage
//!
//! Authenticates to the registry, tags the local artifact with its fully
//! qualified registry path and pushes it. Authentication failures are
//! fatal; push failures are transient and retried by the orchestrator
//! under this stage's retry policy. Every diagnostic coming back from the
//! registry adapter is scrubbed through credential redaction before it can
//! reach a log or report.

use async_trait::async_trait;
use gantry_core::domain::{RegistryCredential, StageError, StageName, StageResult, Tag};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::stage::{PipelineStage, RunContext};

/// Registry protocol boundary.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Authenticates against the registry host.
    async fn login(&self, host: &str, credential: &RegistryCredential) -> Result<(), StageError>;

    /// Adds a remote name to a local image.
    async fn tag(&self, local_ref: &str, remote_ref: &str) -> Result<(), StageError>;

    /// Pushes a remote reference. May block on network I/O.
    async fn push(&self, remote_ref: &str) -> Result<(), StageError>;
}

/// Pushes the built artifact to the configured registry.
pub struct PublishStage {
    registry: Arc<dyn RegistryClient>,
    credential: RegistryCredential,
    host: String,
    retry: RetryPolicy,
    timeout: Duration,
}

impl PublishStage {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        credential: RegistryCredential,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            credential,
            host: config.registry_host.clone(),
            retry: RetryPolicy::new(
                config.push_max_retries,
                config.retry_initial_backoff,
                config.retry_max_backoff,
            ),
            timeout: config.network_timeout,
        }
    }

    /// Fully qualified registry path for a tag:
    /// `registry-host/owner/repo:tag`.
    fn remote_ref(&self, tag: &Tag) -> String {
        format!(
            "{}/{}/{}:{}",
            self.host,
            self.credential.owner(),
            self.credential.repository(),
            tag
        )
    }

    fn scrubbed(&self, error: StageError) -> StageResult {
        StageResult::failure(error.map_message(|m| self.credential.redact(m)))
    }
}

#[async_trait]
impl PipelineStage for PublishStage {
    fn name(&self) -> StageName {
        StageName::Publish
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn run(&self, ctx: &RunContext) -> StageResult {
        let Some(artifact) = &ctx.artifact else {
            return StageResult::failure(StageError::PushFailure(
                "no artifact produced by the build stage".to_string(),
            ));
        };

        if let Err(e) = self.registry.login(&self.host, &self.credential).await {
            return self.scrubbed(e);
        }

        let remote = self.remote_ref(&artifact.tag);

        if let Err(e) = self.registry.tag(&artifact.local_ref(), &remote).await {
            return self.scrubbed(e);
        }

        info!("Pushing {}", remote);

        match tokio::time::timeout(self.timeout, self.registry.push(&remote)).await {
            Ok(Ok(())) => {
                info!("Pushed {}", remote);
                StageResult::with_artifact(artifact.clone().pushed(remote))
            }
            Ok(Err(e)) => self.scrubbed(e),
            Err(_) => StageResult::failure(StageError::PushFailure(format!(
                "push of {} timed out after {:?}",
                remote, self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::domain::{Artifact, Revision};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct FakeRegistry {
        login_error: Option<StageError>,
        push_error: Option<StageError>,
        login_calls: AtomicU32,
        tag_calls: AtomicU32,
        push_calls: AtomicU32,
        pushed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        async fn login(
            &self,
            _host: &str,
            _credential: &RegistryCredential,
        ) -> Result<(), StageError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            match &self.login_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }

        async fn tag(&self, _local_ref: &str, _remote_ref: &str) -> Result<(), StageError> {
            self.tag_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn push(&self, remote_ref: &str) -> Result<(), StageError> {
            self.push_calls.fetch_add(1, Ordering::SeqCst);
            match &self.push_error {
                Some(e) => Err(e.clone()),
                None => {
                    self.pushed.lock().unwrap().push(remote_ref.to_string());
                    Ok(())
                }
            }
        }
    }

    fn stage_with(registry: Arc<FakeRegistry>) -> PublishStage {
        PublishStage::new(
            registry,
            RegistryCredential::new("acme", "sample-app", "s3cr3t-key"),
            &Config::default(),
        )
    }

    fn ctx_with_artifact() -> (RunContext, Artifact) {
        let revision = Revision::new("abc123").unwrap();
        let mut ctx = RunContext::new(revision);
        let artifact = Artifact::new("sample-app", ctx.tag.clone());
        ctx.artifact = Some(artifact.clone());
        (ctx, artifact)
    }

    #[tokio::test]
    async fn test_publish_returns_fully_qualified_reference() {
        let registry = Arc::new(FakeRegistry::default());
        let stage = stage_with(registry.clone());
        let (ctx, artifact) = ctx_with_artifact();

        let result = stage.run(&ctx).await;

        assert!(result.is_success());
        let expected = format!("docker.cloudsmith.io/acme/sample-app:{}", artifact.tag);
        assert_eq!(
            result.artifact.unwrap().pushed_ref.as_deref(),
            Some(expected.as_str())
        );
        assert_eq!(registry.pushed.lock().unwrap().as_slice(), [expected]);
    }

    #[tokio::test]
    async fn test_auth_failure_skips_push_and_redacts_key() {
        let registry = Arc::new(FakeRegistry {
            login_error: Some(StageError::AuthenticationFailure(
                "401 unauthorized for key s3cr3t-key".into(),
            )),
            ..FakeRegistry::default()
        });
        let stage = stage_with(registry.clone());
        let (ctx, _) = ctx_with_artifact();

        let result = stage.run(&ctx).await;

        assert!(!result.is_success());
        let Some(error) = result.error else {
            panic!("expected a failure");
        };
        assert!(matches!(error, StageError::AuthenticationFailure(_)));
        assert!(!error.to_string().contains("s3cr3t-key"));
        assert!(error.to_string().contains("***"));
        assert_eq!(registry.tag_calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.push_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_push_failure_is_reported_retryable() {
        let registry = Arc::new(FakeRegistry {
            push_error: Some(StageError::PushFailure("connection reset".into())),
            ..FakeRegistry::default()
        });
        let stage = stage_with(registry);
        let (ctx, _) = ctx_with_artifact();

        let result = stage.run(&ctx).await;

        assert!(!result.is_success());
        let error = result.error.unwrap();
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_artifact_fails() {
        let stage = stage_with(Arc::new(FakeRegistry::default()));
        let ctx = RunContext::new(Revision::new("abc123").unwrap());

        let result = stage.run(&ctx).await;
        assert!(!result.is_success());
    }
}
