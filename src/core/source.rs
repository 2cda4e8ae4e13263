//! Source trigger domain model

use serde::{Deserialize, Serialize};

/// Reference to the code repository that triggers the pipeline
///
/// Exactly one source reference exists per pipeline; it is immutable
/// once the plan has been assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Repository in `owner/name` form
    pub repository: String,

    /// Branch to track
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Credential used to authenticate against the repository host
    #[serde(default)]
    pub credential: CredentialRef,
}

/// Named lookup into an external secret store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    /// Secret name in the external store
    pub secret: String,

    /// Field within the secret payload
    pub field: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self {
            secret: "cdk_pipeline_github".to_string(),
            field: "github".to_string(),
        }
    }
}

impl SourceReference {
    /// Check that both repository and branch are present
    pub fn is_complete(&self) -> bool {
        !self.repository.trim().is_empty() && !self.branch.trim().is_empty()
    }
}
