//! Revision identity and tag derivation

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::error::StageError;

/// Hex characters kept from the revision digest when deriving a tag.
const TAG_LEN: usize = 12;

/// Identifier of the source snapshot being built (e.g., a commit hash).
///
/// Immutable once a pipeline run starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(String);

impl Revision {
    /// Creates a revision from a raw identifier.
    ///
    /// Empty identifiers and identifiers containing whitespace are rejected
    /// with [`StageError::InvalidRevision`].
    pub fn new(id: impl Into<String>) -> Result<Self, StageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StageError::InvalidRevision(
                "revision identifier is empty".to_string(),
            ));
        }
        if id.contains(char::is_whitespace) {
            return Err(StageError::InvalidRevision(format!(
                "revision identifier contains whitespace: '{}'",
                id
            )));
        }
        Ok(Self(id))
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the image tag for this revision.
    ///
    /// Pure and deterministic: the same revision always yields the same tag,
    /// and distinct revisions collide only with negligible probability. The
    /// tag is the first 12 hex characters of the SHA-256 digest of the
    /// identifier.
    pub fn derive_tag(&self) -> Tag {
        let digest = Sha256::digest(self.0.as_bytes());
        Tag(hex::encode(digest)[..TAG_LEN].to_string())
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic label derived from a [`Revision`], identifying a build
/// artifact in the local store and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_tag_is_deterministic() {
        let revision = Revision::new("abc123").unwrap();
        assert_eq!(revision.derive_tag(), revision.derive_tag());
        assert_eq!(
            revision.derive_tag(),
            Revision::new("abc123").unwrap().derive_tag()
        );
    }

    #[test]
    fn test_derive_tag_distinct_revisions() {
        let a = Revision::new("abc123").unwrap().derive_tag();
        let b = Revision::new("abc124").unwrap().derive_tag();
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_tag_shape() {
        let tag = Revision::new("abc123").unwrap().derive_tag();
        assert_eq!(tag.as_str().len(), 12);
        assert!(tag.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_revision_rejected() {
        let err = Revision::new("").unwrap_err();
        assert!(matches!(err, StageError::InvalidRevision(_)));
    }

    #[test]
    fn test_whitespace_revision_rejected() {
        let err = Revision::new("abc 123").unwrap_err();
        assert!(matches!(err, StageError::InvalidRevision(_)));
    }
}
