//! Secret store seam for source credential lookup
//!
//! The pipeline's source credential is resolved by name and field from
//! an external store. Resolution fails closed: a missing or empty
//! secret is always an error, never a silently empty token.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by secret resolution
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{name}' (field '{field}') not found in {store}")]
    NotFound {
        name: String,
        field: String,
        store: String,
    },

    #[error("secret '{name}' (field '{field}') resolved to an empty value")]
    Empty { name: String, field: String },
}

/// Trait for secret resolution - allows for different stores
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Resolve a named field of a named secret to a token
    async fn resolve(&self, name: &str, field: &str) -> Result<String, SecretError>;
}

/// Secret store backed by process environment variables
///
/// The lookup key is `NAME_FIELD`, upper-cased, with every
/// non-alphanumeric character replaced by `_`; e.g. the secret
/// `cdk_pipeline_github` with field `github` resolves from
/// `CDK_PIPELINE_GITHUB_GITHUB`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// The environment variable a (name, field) pair maps to
    pub fn variable_name(name: &str, field: &str) -> String {
        format!("{}_{}", name, field)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn resolve(&self, name: &str, field: &str) -> Result<String, SecretError> {
        let variable = Self::variable_name(name, field);
        let value = std::env::var(&variable).map_err(|_| SecretError::NotFound {
            name: name.to_string(),
            field: field.to_string(),
            store: format!("environment (variable {})", variable),
        })?;

        if value.trim().is_empty() {
            return Err(SecretError::Empty {
                name: name.to_string(),
                field: field.to_string(),
            });
        }
        Ok(value)
    }
}
