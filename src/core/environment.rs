//! Environment targets and their resolution from context configuration

use crate::core::plan::AssemblyError;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// A fully resolved deployment destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentTarget {
    /// AWS-style numeric account identifier
    pub account: String,

    /// Region identifier, e.g. `us-east-1`
    pub region: String,
}

/// One entry of the context configuration map
///
/// Fields are optional at parse time so a partially specified entry can
/// be reported as a configuration error instead of a deserialization
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
}

/// Context configuration map, keyed by environment name
///
/// BTreeMap keeps iteration (and therefore any serialized form) stable.
pub type ContextMap = BTreeMap<String, ContextEntry>;

/// Explicit fallback target for environments absent from the context map
///
/// This replaces the original process-wide environment lookup: the
/// library never reads process variables itself, the caller populates
/// the defaults explicitly. Precedence is documented on [`resolve`]:
/// a context map entry always wins over the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDefaults {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl EnvironmentDefaults {
    pub fn new(account: Option<String>, region: Option<String>) -> Self {
        Self { account, region }
    }

    /// The defaults as a complete target, when both fields are set
    pub fn target(&self) -> Option<EnvironmentTarget> {
        match (&self.account, &self.region) {
            (Some(account), Some(region)) => Some(EnvironmentTarget {
                account: account.clone(),
                region: region.clone(),
            }),
            _ => None,
        }
    }
}

fn region_pattern() -> &'static Regex {
    static REGION: OnceLock<Regex> = OnceLock::new();
    REGION.get_or_init(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").unwrap())
}

impl EnvironmentTarget {
    /// Validate field formats for the environment named `environment`
    ///
    /// Accounts are numeric identifiers; regions follow the
    /// `xx-name-N` shape. Surfaced as a configuration error, before any
    /// provisioning attempt.
    pub fn validate(&self, environment: &str) -> Result<(), AssemblyError> {
        if self.account.trim().is_empty() {
            return Err(AssemblyError::MissingTargetField {
                environment: environment.to_string(),
                field: "account",
            });
        }
        if self.region.trim().is_empty() {
            return Err(AssemblyError::MissingTargetField {
                environment: environment.to_string(),
                field: "region",
            });
        }
        if !self.account.chars().all(|c| c.is_ascii_digit()) {
            return Err(AssemblyError::MalformedTargetField {
                environment: environment.to_string(),
                field: "account",
                value: self.account.clone(),
            });
        }
        if !region_pattern().is_match(&self.region) {
            return Err(AssemblyError::MalformedTargetField {
                environment: environment.to_string(),
                field: "region",
                value: self.region.clone(),
            });
        }
        Ok(())
    }
}

/// Resolve the target for `environment`
///
/// Precedence: the context map entry wins outright; the explicit
/// defaults are the fallback only when the environment name is absent
/// from the map. A present-but-partial entry is an error, never merged
/// field-by-field with the defaults.
pub fn resolve(
    environment: &str,
    context: &ContextMap,
    defaults: &EnvironmentDefaults,
) -> Result<EnvironmentTarget, AssemblyError> {
    let target = match context.get(environment) {
        Some(entry) => {
            let account = entry.account.clone().filter(|a| !a.trim().is_empty());
            let region = entry.region.clone().filter(|r| !r.trim().is_empty());
            match (account, region) {
                (Some(account), Some(region)) => EnvironmentTarget { account, region },
                (None, _) => {
                    return Err(AssemblyError::MissingTargetField {
                        environment: environment.to_string(),
                        field: "account",
                    })
                }
                (_, None) => {
                    return Err(AssemblyError::MissingTargetField {
                        environment: environment.to_string(),
                        field: "region",
                    })
                }
            }
        }
        None => defaults
            .target()
            .ok_or_else(|| AssemblyError::MissingContext {
                environment: environment.to_string(),
            })?,
    };

    target.validate(environment)?;
    Ok(target)
}

/// Load a context map from a YAML (or JSON) file
pub fn load_context_file<P: AsRef<Path>>(path: P) -> Result<ContextMap> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let context: ContextMap = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse context file {}", path.display()))?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(entries: &[(&str, &str, &str)]) -> ContextMap {
        entries
            .iter()
            .map(|(name, account, region)| {
                (
                    name.to_string(),
                    ContextEntry {
                        account: Some(account.to_string()),
                        region: Some(region.to_string()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_context_entry_wins_over_defaults() {
        let ctx = context(&[("dev", "111", "us-east-1")]);
        let defaults =
            EnvironmentDefaults::new(Some("999".to_string()), Some("eu-west-1".to_string()));

        let target = resolve("dev", &ctx, &defaults).unwrap();
        assert_eq!(target.account, "111");
        assert_eq!(target.region, "us-east-1");
    }

    #[test]
    fn test_defaults_fill_missing_environment() {
        let ctx = ContextMap::new();
        let defaults =
            EnvironmentDefaults::new(Some("111".to_string()), Some("us-east-1".to_string()));

        let target = resolve("dev", &ctx, &defaults).unwrap();
        assert_eq!(target.account, "111");
    }

    #[test]
    fn test_missing_environment_names_the_key() {
        let ctx = context(&[("dev", "111", "us-east-1")]);
        let err = resolve("prod", &ctx, &EnvironmentDefaults::default()).unwrap_err();
        assert!(err.to_string().contains("prod"));
    }

    #[test]
    fn test_partial_entry_is_not_merged_with_defaults() {
        let mut ctx = ContextMap::new();
        ctx.insert(
            "prod".to_string(),
            ContextEntry {
                account: Some("222".to_string()),
                region: None,
            },
        );
        let defaults =
            EnvironmentDefaults::new(Some("111".to_string()), Some("us-east-1".to_string()));

        let err = resolve("prod", &ctx, &defaults).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MissingTargetField { field: "region", .. }
        ));
    }

    #[test]
    fn test_malformed_account_rejected() {
        let ctx = context(&[("dev", "not-a-number", "us-east-1")]);
        let err = resolve("dev", &ctx, &EnvironmentDefaults::default()).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MalformedTargetField { field: "account", .. }
        ));
    }

    #[test]
    fn test_malformed_region_rejected() {
        let ctx = context(&[("dev", "111", "mars")]);
        let err = resolve("dev", &ctx, &EnvironmentDefaults::default()).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::MalformedTargetField { field: "region", .. }
        ));
    }

    #[test]
    fn test_region_shapes() {
        for region in ["us-east-1", "us-west-2", "eu-central-1", "ap-southeast-2"] {
            assert!(region_pattern().is_match(region), "{region} should match");
        }
        for region in ["useast1", "us-east", "US-EAST-1", ""] {
            assert!(!region_pattern().is_match(region), "{region} should not match");
        }
    }
}
