//! Gantry Core
//!
//! Core types for the Gantry delivery pipeline.
//!
//! This crate contains:
//! - Domain types: Revision, Artifact, DeploymentSpec, RegistryCredential
//! - Stage contracts: results, run states, and the failure taxonomy shared
//!   by every stage

pub mod domain;
