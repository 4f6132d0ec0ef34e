//! Run command handler
//!
//! Loads configuration and the registry credential from the environment,
//! preflights the external tools, runs the pipeline and prints the final
//! report.

use anyhow::{Context, Result};
use colored::*;
use gantry_core::domain::{Revision, RunReport};
use gantry_pipeline::cluster::{KubectlCluster, check_kubectl_available};
use gantry_pipeline::config::{Config, credential_from_env};
use gantry_pipeline::container::{PodmanBuilder, PodmanRegistry, check_podman_available};
use gantry_pipeline::DeliveryPipeline;
use std::sync::Arc;

pub async fn run_pipeline(revision: String) -> Result<()> {
    let revision = Revision::new(revision).context("Invalid revision")?;

    let config = Config::from_env();
    config.validate().context("Invalid pipeline configuration")?;

    let credential = credential_from_env()?;

    check_podman_available()?;
    check_kubectl_available()?;

    println!(
        "{} revision {} (tag {})",
        "Delivering".bold(),
        revision.to_string().cyan(),
        revision.derive_tag().to_string().cyan()
    );

    let pipeline = DeliveryPipeline::standard(
        &config,
        credential,
        Arc::new(PodmanBuilder),
        Arc::new(PodmanRegistry),
        Arc::new(KubectlCluster),
    );

    let report = pipeline.run(revision).await;
    print_report(&report);

    if !report.is_success() {
        anyhow::bail!("pipeline run {} failed", report.run_id);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("{}", "Pipeline run report".bold());
    println!("  Run ID:   {}", report.run_id);
    println!("  Revision: {}", report.revision);
    println!("  Tag:      {}", report.tag);

    if report.is_success() {
        println!("  Status:   {}", "Succeeded".green().bold());
    } else if report.cancelled {
        println!("  Status:   {}", "Failed (cancelled)".yellow().bold());
    } else {
        println!("  Status:   {}", "Failed".red().bold());
    }

    if let Some(stage) = &report.failed_stage {
        println!("  Stage:    {}", stage.to_string().red());
    }

    if let Some(error) = &report.error {
        println!("  Error:    {}", error.to_string().red());
    }

    if let Some(artifact) = &report.artifact {
        if let Some(pushed) = &artifact.pushed_ref {
            println!("  Image:    {}", pushed.green());
        } else {
            println!("  Image:    {} (not pushed)", artifact.local_ref());
        }
    }

    let duration = report.completed_at - report.started_at;
    println!("  Duration: {}ms", duration.num_milliseconds());
}
