//! Gantry Pipeline
//!
//! Staged delivery pipeline for the sample application: Test -> Build ->
//! Scan -> Publish -> Deploy, executed strictly in order by
//! [`DeliveryPipeline`].
//!
//! Each stage is a thin adapter around an external collaborator (test
//! surface, container build tool, registry, cluster) and reports its
//! outcome as a `StageResult`. No stage error propagates as an uncaught
//! fault past the orchestrator; transient publish/deploy failures are
//! retried with bounded exponential backoff.

pub mod cluster;
pub mod config;
pub mod container;
pub mod pipeline;
pub mod retry;
pub mod stage;
pub mod stages;

pub use config::Config;
pub use pipeline::{CancelFlag, DeliveryPipeline};
