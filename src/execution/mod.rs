//! Plan execution: build runner, deployer seam, and the walking engine

pub mod builder;
pub mod deployer;
pub mod engine;

pub use builder::{BuildError, BuildRunner};
pub use deployer::{DeployError, Deployer, DryRunDeployer};
pub use engine::{
    DeployReport, ExecutionEngine, ExecutionEvent, ExecutionOptions, StageReport, WalkFailure,
};
