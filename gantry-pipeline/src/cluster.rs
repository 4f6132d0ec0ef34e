//! Kubectl adapter
//!
//! Real implementation of the cluster boundary: pipes the rendered
//! Kubernetes JSON to `kubectl apply -f -`. Applying is declarative and
//! idempotent; re-applying the same desired state converges to the same
//! cluster state.

use anyhow::{Context, Result};
use async_trait::async_trait;
use gantry_core::domain::StageError;
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::stages::deploy::ClusterClient;

/// Checks if kubectl is installed and available
pub fn check_kubectl_available() -> Result<()> {
    let output = Command::new("kubectl")
        .arg("version")
        .arg("--client")
        .output()
        .context("Failed to execute 'kubectl version'. Is kubectl installed?")?;

    if !output.status.success() {
        anyhow::bail!("kubectl is not working correctly");
    }

    let version = String::from_utf8_lossy(&output.stdout);
    info!("kubectl is available: {}", version.trim());

    Ok(())
}

/// Applies manifests through the kubectl CLI.
pub struct KubectlCluster;

#[async_trait]
impl ClusterClient for KubectlCluster {
    async fn apply(&self, manifest: &Value) -> Result<(), StageError> {
        let payload = serde_json::to_vec(manifest).map_err(|e| {
            StageError::ManifestInvalid(format!("failed to serialize manifest: {}", e))
        })?;

        let mut child = Command::new("kubectl")
            .arg("apply")
            .arg("-f")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StageError::ApplyFailure(format!("failed to execute kubectl apply: {}", e))
            })?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                StageError::ApplyFailure("kubectl apply stdin unavailable".to_string())
            })?;
            stdin.write_all(&payload).map_err(|e| {
                StageError::ApplyFailure(format!("failed to pipe manifest to kubectl: {}", e))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            StageError::ApplyFailure(format!("kubectl apply did not complete: {}", e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!("kubectl apply stdout: {}", stdout.trim());
        }

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StageError::ApplyFailure(format!(
                "kubectl apply failed: exit_code={}, stderr='{}'",
                exit_code,
                stderr.trim()
            )));
        }

        info!("kubectl accepted the desired state");
        Ok(())
    }
}
