//! Podman adapters
//!
//! Real implementations of the build and registry boundaries, shelling out
//! to the podman CLI. Tool output is captured and folded into the stage
//! failure diagnostics; the API key travels over stdin so it never appears
//! in a process list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use gantry_core::domain::{RegistryCredential, StageError};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::stages::build::ImageBuilder;
use crate::stages::publish::RegistryClient;

/// Checks if podman is installed and available
pub fn check_podman_available() -> Result<()> {
    let output = Command::new("podman")
        .arg("--version")
        .output()
        .context("Failed to execute 'podman --version'. Is podman installed?")?;

    if !output.status.success() {
        anyhow::bail!("Podman is not working correctly");
    }

    let version = String::from_utf8_lossy(&output.stdout);
    info!("Podman is available: {}", version.trim());

    Ok(())
}

fn log_output(what: &str, output: &std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.trim().is_empty() {
        debug!("{} stdout: {}", what, stdout.trim());
    }
    if !stderr.trim().is_empty() {
        debug!("{} stderr: {}", what, stderr.trim());
    }
}

fn failure_detail(output: &std::process::Output) -> String {
    let exit_code = output.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("exit_code={}, stderr='{}'", exit_code, stderr.trim())
}

/// Builds images via `podman build`.
pub struct PodmanBuilder;

#[async_trait]
impl ImageBuilder for PodmanBuilder {
    async fn build(
        &self,
        reference: &str,
        context_dir: &Path,
        container_file: &Path,
    ) -> Result<(), StageError> {
        let output = Command::new("podman")
            .arg("build")
            .arg("-f")
            .arg(container_file)
            .arg("-t")
            .arg(reference)
            .arg(context_dir)
            .output()
            .map_err(|e| {
                StageError::BuildFailure(format!("failed to execute podman build: {}", e))
            })?;

        log_output("podman build", &output);

        if !output.status.success() {
            return Err(StageError::BuildFailure(format!(
                "podman build of {} failed: {}",
                reference,
                failure_detail(&output)
            )));
        }

        Ok(())
    }
}

/// Talks to the registry via `podman login`/`tag`/`push`.
pub struct PodmanRegistry;

#[async_trait]
impl RegistryClient for PodmanRegistry {
    async fn login(&self, host: &str, credential: &RegistryCredential) -> Result<(), StageError> {
        if credential.api_key().is_empty() {
            return Err(StageError::AuthenticationFailure(
                "registry API key is empty".to_string(),
            ));
        }

        let mut child = Command::new("podman")
            .arg("login")
            .arg("--username")
            .arg(credential.owner())
            .arg("--password-stdin")
            .arg(host)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StageError::AuthenticationFailure(format!(
                    "failed to execute podman login: {}",
                    e
                ))
            })?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                StageError::AuthenticationFailure("podman login stdin unavailable".to_string())
            })?;
            stdin.write_all(credential.api_key().as_bytes()).map_err(|e| {
                StageError::AuthenticationFailure(format!(
                    "failed to pass credential to podman login: {}",
                    e
                ))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            StageError::AuthenticationFailure(format!("podman login did not complete: {}", e))
        })?;

        log_output("podman login", &output);

        if !output.status.success() {
            return Err(StageError::AuthenticationFailure(format!(
                "login to {} rejected: {}",
                host,
                credential.redact(&failure_detail(&output))
            )));
        }

        info!("Authenticated to registry {}", host);
        Ok(())
    }

    async fn tag(&self, local_ref: &str, remote_ref: &str) -> Result<(), StageError> {
        let output = Command::new("podman")
            .arg("tag")
            .arg(local_ref)
            .arg(remote_ref)
            .output()
            .map_err(|e| {
                StageError::PushFailure(format!("failed to execute podman tag: {}", e))
            })?;

        log_output("podman tag", &output);

        if !output.status.success() {
            return Err(StageError::PushFailure(format!(
                "tagging {} as {} failed: {}",
                local_ref,
                remote_ref,
                failure_detail(&output)
            )));
        }

        Ok(())
    }

    async fn push(&self, remote_ref: &str) -> Result<(), StageError> {
        let output = Command::new("podman")
            .arg("push")
            .arg(remote_ref)
            .output()
            .map_err(|e| {
                StageError::PushFailure(format!("failed to execute podman push: {}", e))
            })?;

        log_output("podman push", &output);

        if !output.status.success() {
            return Err(StageError::PushFailure(format!(
                "push of {} failed: {}",
                remote_ref,
                failure_detail(&output)
            )));
        }

        Ok(())
    }
}
