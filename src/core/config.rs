//! Pipeline manifest loaded from YAML

use crate::core::{
    build::BuildSpecification, environment::ContextMap, resource::FunctionResource,
    source::SourceReference,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level pipeline manifest
///
/// The manifest is pure declaration; all semantic validation happens
/// when the promotion plan is assembled from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineManifest {
    /// Pipeline name
    pub name: String,

    /// The single source trigger
    pub source: SourceReference,

    /// Build commands producing the deployable artifact
    #[serde(default)]
    pub build: BuildSpecification,

    /// Account the pipeline itself lives in; enables the cross-account
    /// check when set
    #[serde(default)]
    pub pipeline_account: Option<String>,

    /// Must be enabled whenever a stage targets a different account
    /// than `pipeline_account`
    #[serde(default)]
    pub cross_account_keys: bool,

    /// The deployable unit promoted through every stage
    #[serde(default)]
    pub resource: FunctionResource,

    /// Promotion order: declared order is execution order
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub stages: Vec<StageEntryConfig>,

    /// Embedded context map; entries from a separate context file
    /// override these
    #[serde(default)]
    pub environments: ContextMap,
}

/// One declared entry of the promotion order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageEntryConfig {
    /// A single sequential stage
    Stage(StageConfig),
    /// A set of stages promoted concurrently
    Wave(WaveConfig),
}

/// Stage declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage identifier
    pub name: String,

    /// Context map key to resolve the target from; defaults to the
    /// stage name
    #[serde(default)]
    pub environment: Option<String>,
}

impl StageConfig {
    /// The context map key this stage resolves against
    pub fn environment_name(&self) -> &str {
        self.environment.as_deref().unwrap_or(&self.name)
    }
}

/// Wave declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    pub name: String,
    pub stages: Vec<StageConfig>,
}

impl PipelineManifest {
    /// Load a manifest from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: PipelineManifest =
            serde_yaml::from_str(yaml).context("Failed to parse pipeline manifest")?;
        Ok(manifest)
    }

    /// All declared stage configs, in promotion order
    pub fn stage_configs(&self) -> Vec<&StageConfig> {
        self.stages
            .iter()
            .flat_map(|entry| match entry {
                StageEntryConfig::Stage(stage) => vec![stage],
                StageEntryConfig::Wave(wave) => wave.stages.iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
  branch: "main"
stages:
  - stage:
      name: "dev"
  - wave:
      name: "prod"
      stages:
        - name: "prod"
environments:
  dev: { account: "111", region: "us-east-1" }
  prod: { account: "222", region: "us-west-2" }
"#;

        let manifest = PipelineManifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.name, "cdk-pipeline");
        assert_eq!(manifest.stages.len(), 2);
        assert_eq!(manifest.build.commands.len(), 3);
        assert_eq!(manifest.stage_configs().len(), 2);
        assert!(matches!(manifest.stages[0], StageEntryConfig::Stage(_)));
        assert!(matches!(manifest.stages[1], StageEntryConfig::Wave(_)));
    }

    #[test]
    fn test_stage_environment_defaults_to_name() {
        let stage = StageConfig {
            name: "dev".to_string(),
            environment: None,
        };
        assert_eq!(stage.environment_name(), "dev");

        let stage = StageConfig {
            name: "prod-eu".to_string(),
            environment: Some("prod".to_string()),
        };
        assert_eq!(stage.environment_name(), "prod");
    }

    #[test]
    fn test_missing_source_fails_to_parse() {
        let yaml = r#"
name: "broken"
stages: []
"#;
        assert!(PipelineManifest::from_yaml(yaml).is_err());
    }
}
