//! stagehand - staged promotion pipelines: one source, one build, an
//! ordered walk over dev and prod deployment targets

pub mod cli;
pub mod core;
pub mod execution;
pub mod secrets;

// Re-export commonly used types
pub use crate::core::{
    AssemblyError, ContextMap, EnvironmentDefaults, EnvironmentTarget, PipelineManifest,
    PlanEntry, PromotionPlan, Stage, StageOutputs, StageState,
};
pub use crate::execution::{
    DeployReport, Deployer, DryRunDeployer, ExecutionEngine, ExecutionEvent, ExecutionOptions,
};
pub use crate::secrets::{EnvSecretStore, SecretError, SecretStore};
