//! Core domain models for stagehand
//!
//! This module defines the fundamental data structures that represent
//! the promotion plan: source trigger, build specification, environment
//! targets, stages, and the plan itself.

pub mod build;
pub mod config;
pub mod environment;
pub mod plan;
pub mod resource;
pub mod source;
pub mod stage;
pub mod state;

pub use build::BuildSpecification;
pub use config::{PipelineManifest, StageConfig, StageEntryConfig, WaveConfig};
pub use environment::{ContextEntry, ContextMap, EnvironmentDefaults, EnvironmentTarget};
pub use plan::{AssemblyError, PromotionPlan};
pub use resource::FunctionResource;
pub use source::{CredentialRef, SourceReference};
pub use stage::{PlanEntry, Stage, StageOutputs, Wave};
pub use state::{ExecutionStatus, PlanState, StageState};
