//! Manifest command handler
//!
//! Renders the deployment and service objects the deploy stage would
//! apply, for inspection or out-of-band application.

use anyhow::{Context, Result};
use gantry_core::domain::DeploymentSpec;

pub fn render_manifest(
    name: &str,
    image: &str,
    image_pull_secret: Option<String>,
) -> Result<()> {
    let mut spec = DeploymentSpec::new(name, image);
    if let Some(secret) = image_pull_secret {
        spec = spec.with_image_pull_secret(secret);
    }

    let manifest = spec.render().context("Invalid deployment spec")?;
    println!("{}", serde_json::to_string_pretty(&manifest)?);

    Ok(())
}
