//! Deployer seam - the external orchestration host behind a trait

use crate::core::{FunctionResource, Stage, StageOutputs};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Errors surfaced by a deployment backend
#[derive(Debug, Error)]
pub enum DeployError {
    /// The target environment rejected the resource graph
    #[error("target {account}/{region} rejected stage '{stage}': {reason}")]
    Rejected {
        stage: String,
        account: String,
        region: String,
        reason: String,
    },

    /// The backend itself failed before the target could answer
    #[error("deployer failure for stage '{stage}': {reason}")]
    Backend { stage: String, reason: String },
}

/// Trait for stage deployment - allows for different backends
///
/// Retries, rollback, and cancellation are capabilities of the backend,
/// never of the callers of this trait.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Instantiate the resource graph in the stage's target environment
    /// and return its named outputs
    async fn deploy(
        &self,
        stage: &Stage,
        resource: &FunctionResource,
    ) -> Result<StageOutputs, DeployError>;
}

/// Deployer that fabricates deterministic outputs without touching any
/// remote environment
#[derive(Debug, Clone, Default)]
pub struct DryRunDeployer;

impl DryRunDeployer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Deployer for DryRunDeployer {
    async fn deploy(
        &self,
        stage: &Stage,
        resource: &FunctionResource,
    ) -> Result<StageOutputs, DeployError> {
        let function_name = format!("{}-function", stage.name);
        let arn = format!(
            "arn:aws:lambda:{}:{}:function:{}",
            stage.target.region, stage.target.account, function_name
        );
        info!(
            stage = %stage.name,
            account = %stage.target.account,
            region = %stage.target.region,
            "dry-run deploy"
        );

        let mut outputs = StageOutputs::new();
        outputs.insert(resource.output.clone(), arn);
        Ok(outputs)
    }
}
