//! Command handlers
//!
//! Routes CLI subcommands to their respective handlers.

mod manifest;
mod run;
mod tag;

use anyhow::Result;
use clap::Subcommand;

/// Top-level commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full delivery pipeline for a revision
    Run {
        /// Source revision to deliver (e.g., a commit hash)
        #[arg(short, long, env = "GANTRY_REVISION")]
        revision: String,
    },
    /// Derive the image tag for a revision
    Tag {
        /// Source revision (e.g., a commit hash)
        revision: String,
    },
    /// Render the Kubernetes manifests for an image reference
    Manifest {
        /// Fully qualified image reference
        #[arg(short, long)]
        image: String,

        /// Deployment and service name
        #[arg(short, long, default_value = "sample-app")]
        name: String,

        /// Image pull secret to reference
        #[arg(long)]
        image_pull_secret: Option<String>,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run { revision } => run::run_pipeline(revision).await,
        Commands::Tag { revision } => tag::derive_tag(&revision),
        Commands::Manifest {
            image,
            name,
            image_pull_secret,
        } => manifest::render_manifest(&name, &image, image_pull_secret),
    }
}
