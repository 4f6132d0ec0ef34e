//! Pipeline configuration
//!
//! Registry coordinates, build inputs, retry bounds and network timeouts
//! are all configurable to allow tuning for different environments.
//! The registry credential is loaded separately from the config so the
//! secret is passed explicitly to the publish stage and never stored in
//! shared state.

use gantry_core::domain::RegistryCredential;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry host images are pushed to
    pub registry_host: String,

    /// Local image name produced by the build stage
    pub image_name: String,

    /// Name of the deployment and service applied to the cluster
    pub deployment_name: String,

    /// Build context directory
    pub context_dir: PathBuf,

    /// Container build definition within the context
    pub container_file: PathBuf,

    /// Pull secret referenced by the deployment, if the registry needs it
    pub image_pull_secret: Option<String>,

    /// Max retries for a failed image push
    pub push_max_retries: u32,

    /// Max retries for a failed cluster apply
    pub apply_max_retries: u32,

    /// First backoff delay between retries; doubles up to the cap
    pub retry_initial_backoff: Duration,

    /// Backoff cap
    pub retry_max_backoff: Duration,

    /// Timeout for the push and apply network operations
    pub network_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            registry_host: "docker.cloudsmith.io".to_string(),
            image_name: "sample-app".to_string(),
            deployment_name: "sample-app".to_string(),
            context_dir: PathBuf::from("."),
            container_file: PathBuf::from("Containerfile"),
            image_pull_secret: None,
            push_max_retries: 3,
            apply_max_retries: 3,
            retry_initial_backoff: Duration::from_millis(500),
            retry_max_backoff: Duration::from_secs(30),
            network_timeout: Duration::from_secs(60),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - REGISTRY_HOST (default: docker.cloudsmith.io)
    /// - IMAGE_NAME (default: sample-app)
    /// - DEPLOYMENT_NAME (default: sample-app)
    /// - BUILD_CONTEXT (default: .)
    /// - CONTAINER_FILE (default: Containerfile)
    /// - IMAGE_PULL_SECRET (default: unset)
    /// - PUSH_MAX_RETRIES (default: 3)
    /// - APPLY_MAX_RETRIES (default: 3)
    /// - RETRY_INITIAL_BACKOFF_MS (default: 500)
    /// - RETRY_MAX_BACKOFF_MS (default: 30000)
    /// - NETWORK_TIMEOUT (seconds, default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::new();

        let registry_host =
            std::env::var("REGISTRY_HOST").unwrap_or(defaults.registry_host);

        let image_name = std::env::var("IMAGE_NAME").unwrap_or(defaults.image_name);

        let deployment_name =
            std::env::var("DEPLOYMENT_NAME").unwrap_or(defaults.deployment_name);

        let context_dir = std::env::var("BUILD_CONTEXT")
            .map(PathBuf::from)
            .unwrap_or(defaults.context_dir);

        let container_file = std::env::var("CONTAINER_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.container_file);

        let image_pull_secret = std::env::var("IMAGE_PULL_SECRET").ok();

        let push_max_retries = std::env::var("PUSH_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.push_max_retries);

        let apply_max_retries = std::env::var("APPLY_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.apply_max_retries);

        let retry_initial_backoff = std::env::var("RETRY_INITIAL_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_initial_backoff);

        let retry_max_backoff = std::env::var("RETRY_MAX_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_max_backoff);

        let network_timeout = std::env::var("NETWORK_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.network_timeout);

        Self {
            registry_host,
            image_name,
            deployment_name,
            context_dir,
            container_file,
            image_pull_secret,
            push_max_retries,
            apply_max_retries,
            retry_initial_backoff,
            retry_max_backoff,
            network_timeout,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.registry_host.trim().is_empty() {
            anyhow::bail!("registry_host cannot be empty");
        }

        if self.image_name.trim().is_empty() {
            anyhow::bail!("image_name cannot be empty");
        }

        if self.image_name.contains(':') || self.image_name.contains('/') {
            anyhow::bail!("image_name must be a bare name without tag or registry path");
        }

        if self.deployment_name.trim().is_empty() {
            anyhow::bail!("deployment_name cannot be empty");
        }

        if self.network_timeout.as_secs() == 0 {
            anyhow::bail!("network_timeout must be greater than 0");
        }

        if self.retry_initial_backoff > self.retry_max_backoff {
            anyhow::bail!("retry_initial_backoff cannot exceed retry_max_backoff");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads the registry credential from the CI environment's secret store.
///
/// Expected environment variables (all required):
/// - REGISTRY_OWNER
/// - REGISTRY_REPO
/// - REGISTRY_API_KEY
pub fn credential_from_env() -> anyhow::Result<RegistryCredential> {
    let owner = std::env::var("REGISTRY_OWNER")
        .map_err(|_| anyhow::anyhow!("REGISTRY_OWNER environment variable not set"))?;

    let repository = std::env::var("REGISTRY_REPO")
        .map_err(|_| anyhow::anyhow!("REGISTRY_REPO environment variable not set"))?;

    let api_key = std::env::var("REGISTRY_API_KEY")
        .map_err(|_| anyhow::anyhow!("REGISTRY_API_KEY environment variable not set"))?;

    Ok(RegistryCredential::new(owner, repository, api_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry_host, "docker.cloudsmith.io");
        assert_eq!(config.image_name, "sample-app");
        assert_eq!(config.push_max_retries, 3);
        assert_eq!(config.retry_initial_backoff, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Empty registry host should fail
        config.registry_host = String::new();
        assert!(config.validate().is_err());

        config.registry_host = "docker.cloudsmith.io".to_string();

        // Image name with a tag should fail
        config.image_name = "sample-app:latest".to_string();
        assert!(config.validate().is_err());

        config.image_name = "sample-app".to_string();
        assert!(config.validate().is_ok());

        // Backoff floor above the cap should fail
        config.retry_initial_backoff = Duration::from_secs(60);
        assert!(config.validate().is_err());
    }
}
