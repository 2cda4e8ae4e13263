//! Scenario: configuration errors surface at assembly, before any
//! command or deployment runs

mod helpers;

use helpers::*;
use stagehand::core::{
    AssemblyError, ContextMap, EnvironmentDefaults, PipelineManifest, PromotionPlan,
};

fn try_assemble(yaml: &str) -> Result<PromotionPlan, AssemblyError> {
    let manifest = PipelineManifest::from_yaml(yaml).expect("manifest should parse");
    PromotionPlan::assemble(&manifest, &ContextMap::new(), &EnvironmentDefaults::default())
}

#[test]
fn test_missing_prod_key_fails_naming_the_key() {
    let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
stages:
  - stage:
      name: "dev"
  - wave:
      name: "prod"
      stages:
        - name: "prod"
environments:
  dev: { account: "111", region: "us-east-1" }
"#;

    let err = try_assemble(yaml).unwrap_err();
    assert!(
        matches!(err, AssemblyError::MissingContext { ref environment } if environment == "prod")
    );
    assert!(err.to_string().contains("prod"));
}

#[test]
fn test_partial_prod_entry_fails_before_any_stage() {
    let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
stages:
  - stage:
      name: "dev"
  - wave:
      name: "prod"
      stages:
        - name: "prod"
environments:
  dev: { account: "111", region: "us-east-1" }
  prod: { account: "222" }
"#;

    let err = try_assemble(yaml).unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::MissingTargetField { ref environment, field: "region" } if environment == "prod"
    ));
}

#[test]
fn test_cross_account_stage_requires_key_material_flag() {
    let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
pipeline_account: "111"
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

    let err = try_assemble(yaml).unwrap_err();
    assert!(matches!(err, AssemblyError::CrossAccountKeysRequired { .. }));
    assert!(err.to_string().contains("cross_account_keys"));
}

#[tokio::test]
async fn test_assembly_error_means_zero_deployments() {
    let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
stages:
  - stage:
      name: "dev"
  - wave:
      name: "prod"
      stages:
        - name: "prod"
environments:
  dev: { account: "111", region: "us-east-1" }
"#;

    // Assembly fails; nothing reaches a deployer
    let (deployer, calls) = MockDeployer::new();
    let result = try_assemble(yaml);
    assert!(result.is_err());
    drop(deployer);
    assert!(recorded_calls(&calls).is_empty());
}

#[test]
fn test_unsupported_runtime_is_a_configuration_error() {
    let yaml = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
resource:
  runtime: "ruby2.5"
stages:
  - stage:
      name: "dev"
environments:
  dev: { account: "111", region: "us-east-1" }
"#;

    let err = try_assemble(yaml).unwrap_err();
    assert!(matches!(err, AssemblyError::UnsupportedRuntime { .. }));
}
