//! Stage results and run states

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::artifact::Artifact;
use crate::domain::error::StageError;

/// Pipeline stage identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageName {
    Test,
    Build,
    Scan,
    Publish,
    Deploy,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Test => "Test",
            StageName::Build => "Build",
            StageName::Scan => "Scan",
            StageName::Publish => "Publish",
            StageName::Deploy => "Deploy",
        }
    }

    /// The state the orchestrator is in while this stage executes.
    pub fn running_state(&self) -> RunState {
        match self {
            StageName::Test => RunState::Testing,
            StageName::Build => RunState::Building,
            StageName::Scan => RunState::Scanning,
            StageName::Publish => RunState::Publishing,
            StageName::Deploy => RunState::Deploying,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator state machine.
///
/// A run moves from `Idle` through the per-stage states in order and ends
/// in one of the terminal states. Any stage failure transitions directly to
/// `Failed`; no later stage executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Testing,
    Building,
    Scanning,
    Publishing,
    Deploying,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

/// Outcome status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Success,
    Failure,
}

/// Outcome of a single stage execution.
///
/// Created by the stage, consumed by the orchestrator to decide
/// continuation, and not retained after the run.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub status: StageStatus,
    /// Artifact produced by the stage, forwarded to later stages
    pub artifact: Option<Artifact>,
    /// Failure kind and diagnostic, present on failure only
    pub error: Option<StageError>,
}

impl StageResult {
    pub fn success() -> Self {
        Self {
            status: StageStatus::Success,
            artifact: None,
            error: None,
        }
    }

    pub fn with_artifact(artifact: Artifact) -> Self {
        Self {
            status: StageStatus::Success,
            artifact: Some(artifact),
            error: None,
        }
    }

    pub fn failure(error: StageError) -> Self {
        Self {
            status: StageStatus::Failure,
            artifact: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::revision::Revision;

    #[test]
    fn test_running_states_follow_stage_order() {
        assert_eq!(StageName::Test.running_state(), RunState::Testing);
        assert_eq!(StageName::Build.running_state(), RunState::Building);
        assert_eq!(StageName::Scan.running_state(), RunState::Scanning);
        assert_eq!(StageName::Publish.running_state(), RunState::Publishing);
        assert_eq!(StageName::Deploy.running_state(), RunState::Deploying);
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Succeeded.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Deploying.is_terminal());
    }

    #[test]
    fn test_stage_result_constructors() {
        assert!(StageResult::success().is_success());

        let tag = Revision::new("abc123").unwrap().derive_tag();
        let result = StageResult::with_artifact(Artifact::new("sample-app", tag));
        assert!(result.is_success());
        assert!(result.artifact.is_some());

        let result = StageResult::failure(StageError::TestFailure("health_check".into()));
        assert!(!result.is_success());
        assert!(matches!(result.error, Some(StageError::TestFailure(_))));
    }
}
