//! Build artifact types

use serde::{Deserialize, Serialize};

use crate::domain::revision::Tag;

/// A built container image plus its identifying tag.
///
/// Created by the build stage, consumed read-only by publish and deploy,
/// and discarded at run end. Only the pushed registry copy and the live
/// deployment persist beyond the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Local image name, e.g. `sample-app`
    pub image: String,
    /// Tag derived from the run's revision
    pub tag: Tag,
    /// Fully qualified registry reference, set once the image is pushed
    pub pushed_ref: Option<String>,
}

impl Artifact {
    pub fn new(image: impl Into<String>, tag: Tag) -> Self {
        Self {
            image: image.into(),
            tag,
            pushed_ref: None,
        }
    }

    /// Local image reference, e.g. `sample-app:4f2d8a1c9b3e`.
    pub fn local_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Marks the artifact as pushed under the given registry path.
    pub fn pushed(mut self, reference: impl Into<String>) -> Self {
        self.pushed_ref = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::revision::Revision;

    #[test]
    fn test_local_ref() {
        let tag = Revision::new("abc123").unwrap().derive_tag();
        let artifact = Artifact::new("sample-app", tag.clone());
        assert_eq!(artifact.local_ref(), format!("sample-app:{}", tag));
        assert!(artifact.pushed_ref.is_none());
    }

    #[test]
    fn test_pushed_sets_reference() {
        let tag = Revision::new("abc123").unwrap().derive_tag();
        let artifact = Artifact::new("sample-app", tag)
            .pushed("docker.cloudsmith.io/acme/sample-app:4f2d8a1c9b3e");
        assert_eq!(
            artifact.pushed_ref.as_deref(),
            Some("docker.cloudsmith.io/acme/sample-app:4f2d8a1c9b3e")
        );
    }
}
