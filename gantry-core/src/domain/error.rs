//! Stage failure taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure kinds a pipeline stage can report.
///
/// Every collaborator error is converted into one of these at the stage
/// boundary and carried inside a `StageResult`; none of them propagate as
/// uncaught faults past the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StageError {
    /// Revision identifier is empty or malformed
    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    /// One or more service checks failed
    #[error("test failure: {0}")]
    TestFailure(String),

    /// Container image build failed
    #[error("build failure: {0}")]
    BuildFailure(String),

    /// Registry rejected the credential
    #[error("registry authentication failed: {0}")]
    AuthenticationFailure(String),

    /// Image push did not complete
    #[error("image push failed: {0}")]
    PushFailure(String),

    /// Deployment spec failed validation
    #[error("invalid manifest: {0}")]
    ManifestInvalid(String),

    /// Cluster did not accept the desired state
    #[error("cluster apply failed: {0}")]
    ApplyFailure(String),
}

impl StageError {
    /// Whether the failure is transient and worth retrying.
    ///
    /// Authentication and manifest errors indicate misconfiguration and are
    /// always fatal; push and apply errors may be network transients.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StageError::PushFailure(_) | StageError::ApplyFailure(_)
        )
    }

    /// Returns the same failure kind with its message rewritten.
    ///
    /// Used by the publish stage to scrub credentials out of diagnostics
    /// coming back from the registry adapter.
    pub fn map_message<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            StageError::InvalidRevision(m) => StageError::InvalidRevision(f(&m)),
            StageError::TestFailure(m) => StageError::TestFailure(f(&m)),
            StageError::BuildFailure(m) => StageError::BuildFailure(f(&m)),
            StageError::AuthenticationFailure(m) => StageError::AuthenticationFailure(f(&m)),
            StageError::PushFailure(m) => StageError::PushFailure(f(&m)),
            StageError::ManifestInvalid(m) => StageError::ManifestInvalid(f(&m)),
            StageError::ApplyFailure(m) => StageError::ApplyFailure(f(&m)),
        }
    }
}
