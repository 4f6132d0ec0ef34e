//! Pipeline orchestrator
//!
//! Runs the configured stages strictly in order, forwarding the produced
//! artifact from each stage to the next through the run context. The first
//! failure is terminal: later stages never execute, and nothing already
//! pushed or applied is rolled back. Retry policy is local to each stage;
//! whole runs are never retried.

use gantry_core::domain::{RegistryCredential, Revision, RunReport, RunState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::retry::run_with_retry;
use crate::stage::{PipelineStage, RunContext};
use crate::stages::build::{BuildStage, ImageBuilder};
use crate::stages::deploy::{ClusterClient, DeployStage};
use crate::stages::publish::{PublishStage, RegistryClient};
use crate::stages::scan::ScanStage;
use crate::stages::test::TestStage;

/// Cooperative cancellation, honored at stage boundaries only.
///
/// Cancelling never interrupts a stage mid-flight: a push or apply that has
/// started will finish, and whatever it produced stays as-is.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The staged delivery pipeline.
///
/// Holds an explicit ordered list of stages; optional stages (such as the
/// image scan) slot into the list without any change to the control flow.
pub struct DeliveryPipeline {
    stages: Vec<Box<dyn PipelineStage>>,
}

impl DeliveryPipeline {
    /// Creates a pipeline over an explicit stage list, run in order.
    pub fn new(stages: Vec<Box<dyn PipelineStage>>) -> Self {
        Self { stages }
    }

    /// Standard delivery flow for the sample application:
    /// Test -> Build -> Scan -> Publish -> Deploy.
    pub fn standard(
        config: &Config,
        credential: RegistryCredential,
        builder: Arc<dyn ImageBuilder>,
        registry: Arc<dyn RegistryClient>,
        cluster: Arc<dyn ClusterClient>,
    ) -> Self {
        Self::new(vec![
            Box::new(TestStage::new()),
            Box::new(BuildStage::new(builder, config)),
            Box::new(ScanStage),
            Box::new(PublishStage::new(registry, credential, config)),
            Box::new(DeployStage::new(cluster, config)),
        ])
    }

    /// Executes one run for the given revision.
    pub async fn run(&self, revision: Revision) -> RunReport {
        self.run_with_cancel(revision, &CancelFlag::new()).await
    }

    /// Executes one run that can be cancelled at stage boundaries.
    pub async fn run_with_cancel(&self, revision: Revision, cancel: &CancelFlag) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = chrono::Utc::now();
        let mut ctx = RunContext::new(revision);

        info!(
            "Run {} started: revision {} -> tag {}",
            run_id, ctx.revision, ctx.tag
        );

        for stage in &self.stages {
            if cancel.is_cancelled() {
                warn!(
                    "Run {} cancelled before {} stage",
                    run_id,
                    stage.name()
                );
                return RunReport {
                    run_id,
                    revision: ctx.revision,
                    tag: ctx.tag,
                    state: RunState::Failed,
                    failed_stage: Some(stage.name()),
                    error: None,
                    cancelled: true,
                    artifact: ctx.artifact,
                    started_at,
                    completed_at: chrono::Utc::now(),
                };
            }

            info!("Run {}: {:?}", run_id, stage.name().running_state());

            let result =
                run_with_retry(stage.name().as_str(), stage.retry_policy(), || {
                    stage.run(&ctx)
                })
                .await;

            if let Some(stage_error) = result.error {
                error!(
                    "Run {} failed in {} stage: {}",
                    run_id,
                    stage.name(),
                    stage_error
                );
                return RunReport {
                    run_id,
                    revision: ctx.revision,
                    tag: ctx.tag,
                    state: RunState::Failed,
                    failed_stage: Some(stage.name()),
                    error: Some(stage_error),
                    cancelled: false,
                    artifact: ctx.artifact,
                    started_at,
                    completed_at: chrono::Utc::now(),
                };
            }

            if let Some(artifact) = result.artifact {
                ctx.artifact = Some(artifact);
            }
        }

        info!("Run {} succeeded", run_id);

        RunReport {
            run_id,
            revision: ctx.revision,
            tag: ctx.tag,
            state: RunState::Succeeded,
            failed_stage: None,
            error: None,
            cancelled: false,
            artifact: ctx.artifact,
            started_at,
            completed_at: chrono::Utc::now(),
        }
    }
}
