//! Runtime execution state for a plan walk
//!
//! State here describes a single `deploy` run; it is never part of the
//! synthesized artifact, which stays timestamp-free so synth remains
//! idempotent.

use crate::core::stage::StageOutputs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall status of a plan walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Walk has not started
    Pending,
    /// Build commands are running
    Building,
    /// Stages are being promoted
    Running,
    /// All entries completed successfully
    Completed,
    /// Build or a stage failed; subsequent entries were not attempted
    Failed,
}

/// State of a single stage during a plan walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageState {
    /// Stage has not been reached yet
    Pending,
    /// Stage deployment is in flight
    Deploying { started_at: DateTime<Utc> },
    /// Stage deployed; outputs are read-only downstream
    Deployed {
        outputs: StageOutputs,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Target environment rejected the resource graph
    Failed {
        error: String,
        failed_at: DateTime<Utc>,
    },
    /// Stage was never attempted because an earlier entry failed
    Skipped { reason: String },
}

impl StageState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageState::Deployed { .. } | StageState::Failed { .. } | StageState::Skipped { .. }
        )
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, StageState::Deployed { .. })
    }
}

/// State of the overall plan walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanState {
    /// Unique id for this walk
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub total_stages: usize,
    pub deployed_stages: usize,
    pub failed_stages: usize,
}

impl PlanState {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            total_stages: 0,
            deployed_stages: 0,
            failed_stages: 0,
        }
    }

    /// Mark the walk as started, entering the build phase
    pub fn start(&mut self, total_stages: usize) {
        self.status = ExecutionStatus::Building;
        self.started_at = Some(Utc::now());
        self.total_stages = total_stages;
    }

    /// Build finished; stages are being promoted
    pub fn promote(&mut self) {
        self.status = ExecutionStatus::Running;
    }

    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Fraction of stages that reached a terminal outcome (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_stages == 0 {
            return 0.0;
        }
        (self.deployed_stages + self.failed_stages) as f64 / self.total_stages as f64
    }
}

impl Default for PlanState {
    fn default() -> Self {
        Self::new()
    }
}
