//! Stage contract
//!
//! A stage receives its inputs read-only through the run context and
//! returns a fresh `StageResult`; the orchestrator owns the context and
//! merges each produced artifact back in. Stages never share mutable
//! state, so independent runs can execute concurrently.

use async_trait::async_trait;
use gantry_core::domain::{Artifact, Revision, StageName, StageResult, Tag};

use crate::retry::RetryPolicy;

/// Inputs forwarded from one stage to the next within a single run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub revision: Revision,
    /// Tag derived from the revision at run start
    pub tag: Tag,
    /// Artifact produced by the build stage, fully qualified after publish
    pub artifact: Option<Artifact>,
}

impl RunContext {
    pub fn new(revision: Revision) -> Self {
        let tag = revision.derive_tag();
        Self {
            revision,
            tag,
            artifact: None,
        }
    }
}

/// One discrete unit of pipeline work.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Which stage this is; determines the orchestrator state while it runs.
    fn name(&self) -> StageName;

    /// Retry bounds for the stage's transient failures.
    ///
    /// Defaults to no retries; only publish and deploy override this.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::none()
    }

    /// Executes the stage against the given context.
    async fn run(&self, ctx: &RunContext) -> StageResult;
}
