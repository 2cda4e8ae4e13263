//! Test utility functions for stagehand

use async_trait::async_trait;
use stagehand::core::{
    ContextMap, EnvironmentDefaults, FunctionResource, PipelineManifest, PromotionPlan, Stage,
    StageOutputs,
};
use stagehand::execution::{
    DeployError, DeployReport, Deployer, ExecutionEngine, ExecutionOptions,
};
use std::sync::{Arc, Mutex};

/// Manifest used by most scenarios: dev stage, then a prod wave
pub const DEV_PROD_MANIFEST: &str = r#"
name: "cdk-pipeline"
source:
  repository: "patel0ankur/cdk_pipeline"
  branch: "main"
build:
  commands:
    - "true"
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

/// Mock deployer that records call order and fails scripted stages
pub struct MockDeployer {
    calls: Arc<Mutex<Vec<String>>>,
    fail_stages: Vec<String>,
}

impl MockDeployer {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        Self::failing(&[])
    }

    /// A deployer that rejects the named stages
    pub fn failing(stages: &[&str]) -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let deployer = Self {
            calls: calls.clone(),
            fail_stages: stages.iter().map(|s| s.to_string()).collect(),
        };
        (deployer, calls)
    }
}

#[async_trait]
impl Deployer for MockDeployer {
    async fn deploy(
        &self,
        stage: &Stage,
        resource: &FunctionResource,
    ) -> Result<StageOutputs, DeployError> {
        self.calls.lock().unwrap().push(stage.name.clone());

        if self.fail_stages.contains(&stage.name) {
            return Err(DeployError::Rejected {
                stage: stage.name.clone(),
                account: stage.target.account.clone(),
                region: stage.target.region.clone(),
                reason: "resource graph rejected".to_string(),
            });
        }

        let mut outputs = StageOutputs::new();
        outputs.insert(
            resource.output.clone(),
            format!(
                "arn:aws:lambda:{}:{}:function:{}-function",
                stage.target.region, stage.target.account, stage.name
            ),
        );
        Ok(outputs)
    }
}

/// Assemble a plan from YAML with no extra context and no defaults
pub fn assemble_yaml(yaml: &str) -> PromotionPlan {
    let manifest = PipelineManifest::from_yaml(yaml).expect("manifest should parse");
    PromotionPlan::assemble(&manifest, &ContextMap::new(), &EnvironmentDefaults::default())
        .expect("plan should assemble")
}

/// Walk a plan with the given deployer and default options
pub async fn walk<D: Deployer + 'static>(plan: &PromotionPlan, deployer: D) -> DeployReport {
    let engine = ExecutionEngine::new(deployer);
    engine.execute(plan, &ExecutionOptions::default()).await
}

/// Names of all calls recorded by a mock deployer
pub fn recorded_calls(calls: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    calls.lock().unwrap().clone()
}
