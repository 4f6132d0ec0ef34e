//! Build stage
//!
//! Produces the container image for the revision under test. Build tool
//! errors are fatal to the run; there is no retry.

use async_trait::async_trait;
use gantry_core::domain::{Artifact, StageError, StageName, StageResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::stage::{PipelineStage, RunContext};

/// Container build tool boundary.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Builds an image under the given local reference from the context
    /// directory and build definition.
    async fn build(
        &self,
        reference: &str,
        context_dir: &Path,
        container_file: &Path,
    ) -> Result<(), StageError>;
}

/// Builds the service image, labeled with the tag derived from the run's
/// revision.
pub struct BuildStage {
    builder: Arc<dyn ImageBuilder>,
    image_name: String,
    context_dir: PathBuf,
    container_file: PathBuf,
}

impl BuildStage {
    pub fn new(builder: Arc<dyn ImageBuilder>, config: &Config) -> Self {
        Self {
            builder,
            image_name: config.image_name.clone(),
            context_dir: config.context_dir.clone(),
            container_file: config.container_file.clone(),
        }
    }
}

#[async_trait]
impl PipelineStage for BuildStage {
    fn name(&self) -> StageName {
        StageName::Build
    }

    async fn run(&self, ctx: &RunContext) -> StageResult {
        let artifact = Artifact::new(&self.image_name, ctx.tag.clone());

        info!(
            "Building image {} from {}",
            artifact.local_ref(),
            self.context_dir.display()
        );

        match self
            .builder
            .build(&artifact.local_ref(), &self.context_dir, &self.container_file)
            .await
        {
            Ok(()) => {
                info!("Image {} built", artifact.local_ref());
                StageResult::with_artifact(artifact)
            }
            Err(e) => StageResult::failure(e),
        }
    }
}
