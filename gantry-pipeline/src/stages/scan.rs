//! Security scan stage
//!
//! Placeholder in the delivery flow: no scanner is wired up, so the stage
//! reports success without inspecting the image. It sits between build and
//! publish so a real scanner can be dropped in without touching the
//! orchestrator.

use async_trait::async_trait;
use gantry_core::domain::{StageName, StageResult};
use tracing::info;

use crate::stage::{PipelineStage, RunContext};

pub struct ScanStage;

#[async_trait]
impl PipelineStage for ScanStage {
    fn name(&self) -> StageName {
        StageName::Scan
    }

    async fn run(&self, ctx: &RunContext) -> StageResult {
        match &ctx.artifact {
            Some(artifact) => info!(
                "Image scan not configured, skipping scan of {}",
                artifact.local_ref()
            ),
            None => info!("Image scan not configured, skipping"),
        }
        StageResult::success()
    }
}
