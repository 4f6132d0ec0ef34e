//! Registry credentials

use std::fmt;

/// Credential used to authenticate against the image registry.
///
/// Passed explicitly to the publish stage and never stored in process-wide
/// state. The API key is only reachable through [`RegistryCredential::api_key`];
/// the `Debug` form keeps it redacted, and the type is deliberately not
/// serializable so it cannot end up in a persisted report.
#[derive(Clone)]
pub struct RegistryCredential {
    owner: String,
    repository: String,
    api_key: String,
}

impl RegistryCredential {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            api_key: api_key.into(),
        }
    }

    /// Registry namespace the image is pushed under.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name within the owner's namespace.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The secret API key. Keep out of logs and diagnostics.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replaces any occurrence of the API key in `text` with `***`.
    pub fn redact(&self, text: &str) -> String {
        if self.api_key.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.api_key, "***")
        }
    }
}

impl fmt::Debug for RegistryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredential")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("api_key", &"***")
            .finish()
    }
}
