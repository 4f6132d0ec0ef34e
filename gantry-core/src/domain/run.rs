//! Pipeline run report

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::artifact::Artifact;
use crate::domain::error::StageError;
use crate::domain::revision::{Revision, Tag};
use crate::domain::stage::{RunState, StageName};

/// Final report of a pipeline run.
///
/// Per-stage results are not retained; the report carries what an operator
/// needs after the fact: the terminal state, the failing stage if any, and
/// the artifact that reached the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub revision: Revision,
    pub tag: Tag,
    pub state: RunState,
    /// Stage the run failed in, when `state` is `Failed`
    pub failed_stage: Option<StageName>,
    pub error: Option<StageError>,
    /// True when the run was stopped at a stage boundary by cancellation
    pub cancelled: bool,
    pub artifact: Option<Artifact>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.state == RunState::Succeeded
    }
}
