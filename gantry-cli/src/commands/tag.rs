//! Tag command handler

use anyhow::{Context, Result};
use gantry_core::domain::Revision;

/// Prints the deterministic tag for a revision.
pub fn derive_tag(revision: &str) -> Result<()> {
    let revision = Revision::new(revision).context("Invalid revision")?;
    println!("{}", revision.derive_tag());
    Ok(())
}
