//! Stage adapters
//!
//! One module per stage of the delivery flow. Each adapter wraps an
//! external collaborator behind a trait and converts its errors into the
//! stage failure taxonomy at the boundary.

pub mod build;
pub mod deploy;
pub mod publish;
pub mod scan;
pub mod test;

pub use build::{BuildStage, ImageBuilder};
pub use deploy::{ClusterClient, DeployStage};
pub use publish::{PublishStage, RegistryClient};
pub use scan::ScanStage;
pub use test::TestStage;
