//! Deployment desired state

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::error::StageError;

/// Replica count for the sample service.
pub const DEFAULT_REPLICAS: u32 = 3;

/// Port the containerized service listens on.
pub const CONTAINER_PORT: u16 = 8000;

/// External port exposed by the load-balanced service.
pub const SERVICE_PORT: u16 = 80;

/// Desired state applied to the cluster by the deploy stage.
///
/// Rendering and applying the same spec twice converges to the same cluster
/// state; the cluster's actual state converges asynchronously and is not
/// tracked by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Deployment and service name; also the `app` selector label
    pub name: String,
    /// Fully qualified image reference produced by the publish stage
    pub image: String,
    pub replicas: u32,
    pub container_port: u16,
    pub service_port: u16,
    /// Pull secret name, when the registry requires authentication
    pub image_pull_secret: Option<String>,
}

impl DeploymentSpec {
    /// Creates a spec with the standard topology: 3 replicas, container
    /// port 8000 exposed through a load balancer on port 80.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            replicas: DEFAULT_REPLICAS,
            container_port: CONTAINER_PORT,
            service_port: SERVICE_PORT,
            image_pull_secret: None,
        }
    }

    pub fn with_image_pull_secret(mut self, secret: impl Into<String>) -> Self {
        self.image_pull_secret = Some(secret.into());
        self
    }

    /// Validates the spec before it is handed to the cluster.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.name.trim().is_empty() {
            return Err(StageError::ManifestInvalid(
                "deployment name cannot be empty".to_string(),
            ));
        }
        if self.image.trim().is_empty() {
            return Err(StageError::ManifestInvalid(
                "image reference cannot be empty".to_string(),
            ));
        }
        if self.replicas == 0 {
            return Err(StageError::ManifestInvalid(
                "replica count must be greater than 0".to_string(),
            ));
        }
        if self.container_port == 0 || self.service_port == 0 {
            return Err(StageError::ManifestInvalid(
                "ports must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Renders the Kubernetes objects for this spec.
    ///
    /// Returns a `List` holding the Deployment and its Service so the whole
    /// desired state can be applied in a single call.
    pub fn render(&self) -> Result<Value, StageError> {
        self.validate()?;
        Ok(json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": [self.deployment(), self.service()],
        }))
    }

    fn deployment(&self) -> Value {
        let mut pod_spec = json!({
            "containers": [{
                "name": self.name,
                "image": self.image,
                "ports": [{ "containerPort": self.container_port }],
            }],
        });
        if let Some(secret) = &self.image_pull_secret {
            pod_spec["imagePullSecrets"] = json!([{ "name": secret }]);
        }
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": self.name,
                "labels": { "app": self.name },
            },
            "spec": {
                "replicas": self.replicas,
                "selector": { "matchLabels": { "app": self.name } },
                "template": {
                    "metadata": { "labels": { "app": self.name } },
                    "spec": pod_spec,
                },
            },
        })
    }

    fn service(&self) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": self.name },
            "spec": {
                "type": "LoadBalancer",
                "selector": { "app": self.name },
                "ports": [{
                    "port": self.service_port,
                    "targetPort": self.container_port,
                }],
            },
        })
    }
}
