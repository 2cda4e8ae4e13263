//! Main execution engine - walks a promotion plan entry by entry

use crate::{
    core::{
        ExecutionStatus, PlanState, PromotionPlan, Stage, StageOutputs, StageState, Wave,
    },
    execution::{BuildError, BuildRunner, DeployError, Deployer},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur while walking a plan
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PlanStarted {
        execution_id: Uuid,
        plan_name: String,
    },
    BuildStarted {
        total_commands: usize,
    },
    CommandCompleted {
        command: String,
    },
    BuildFailed {
        command: String,
        error: String,
    },
    StageStarted {
        stage: String,
    },
    WaveStarted {
        wave: String,
        stages: Vec<String>,
    },
    StageDeployed {
        stage: String,
        outputs: StageOutputs,
    },
    StageFailed {
        stage: String,
        error: String,
    },
    PlanCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// What halted a plan walk
#[derive(Debug, Error)]
pub enum WalkFailure {
    #[error("build halted: {0}")]
    Build(#[from] BuildError),

    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: DeployError,
    },
}

/// Outcome of one stage within a walk
#[derive(Debug, Clone)]
pub struct StageReport {
    pub name: String,
    pub state: StageState,
}

/// Full record of a plan walk
///
/// Returned for failed walks too, so the operator can see which stage
/// halted promotion and which earlier stages remain deployed.
#[derive(Debug)]
pub struct DeployReport {
    pub plan_name: String,
    pub state: PlanState,
    pub stages: Vec<StageReport>,
    pub failure: Option<WalkFailure>,
}

impl DeployReport {
    pub fn succeeded(&self) -> bool {
        self.state.status == ExecutionStatus::Completed
    }

    pub fn stage_state(&self, name: &str) -> Option<&StageState> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.state)
    }

    /// Outputs of a deployed stage, if it reached that state
    pub fn outputs(&self, name: &str) -> Option<&StageOutputs> {
        match self.stage_state(name) {
            Some(StageState::Deployed { outputs, .. }) => Some(outputs),
            _ => None,
        }
    }
}

/// Options controlling a single walk
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Skip the build phase (artifact already produced)
    pub skip_build: bool,
}

/// Walks a promotion plan: build first, then stages and waves in
/// declared order
pub struct ExecutionEngine<D> {
    deployer: Arc<D>,
    runner: BuildRunner,
    event_handlers: Vec<EventHandler>,
}

impl<D: Deployer + 'static> ExecutionEngine<D> {
    pub fn new(deployer: D) -> Self {
        Self {
            deployer: Arc::new(deployer),
            runner: BuildRunner::new(),
            event_handlers: Vec::new(),
        }
    }

    pub fn with_runner(deployer: D, runner: BuildRunner) -> Self {
        Self {
            deployer: Arc::new(deployer),
            runner,
            event_handlers: Vec::new(),
        }
    }

    /// Register an event handler; handlers must be registered before
    /// the walk starts
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Walk the entire plan
    pub async fn execute(&self, plan: &PromotionPlan, options: &ExecutionOptions) -> DeployReport {
        let mut state = PlanState::new();
        let execution_id = state.execution_id;
        state.start(plan.stage_count());

        let mut stages: Vec<StageReport> = plan
            .stages()
            .iter()
            .map(|s| StageReport {
                name: s.name.clone(),
                state: StageState::Pending,
            })
            .collect();
        let index: HashMap<String, usize> = stages
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        info!("Starting plan walk: {} ({})", plan.name, execution_id);
        self.emit(ExecutionEvent::PlanStarted {
            execution_id,
            plan_name: plan.name.clone(),
        });

        // Build phase: any non-zero exit halts before any stage begins
        if options.skip_build {
            info!("Skipping build phase");
        } else {
            self.emit(ExecutionEvent::BuildStarted {
                total_commands: plan.build.len(),
            });
            for command in &plan.build.commands {
                if let Err(build_error) = self.runner.run_command(command).await {
                    error!("Build halted: {}", build_error);
                    self.emit(ExecutionEvent::BuildFailed {
                        command: command.clone(),
                        error: build_error.to_string(),
                    });
                    for report in &mut stages {
                        report.state = StageState::Skipped {
                            reason: format!("build command '{}' failed", command),
                        };
                    }
                    state.fail();
                    self.emit(ExecutionEvent::PlanCompleted {
                        execution_id,
                        status: ExecutionStatus::Failed,
                    });
                    return DeployReport {
                        plan_name: plan.name.clone(),
                        state,
                        stages,
                        failure: Some(WalkFailure::Build(build_error)),
                    };
                }
                self.emit(ExecutionEvent::CommandCompleted {
                    command: command.clone(),
                });
            }
        }

        state.promote();

        // Promotion phase: strict left-to-right over entries; a failing
        // stage halts everything after it, earlier stages stay deployed
        let mut failure: Option<WalkFailure> = None;
        for entry in &plan.entries {
            if let Some(ref halted) = failure {
                let reason = format!("promotion halted: {}", halted);
                for stage in entry.stages() {
                    if let Some(&i) = index.get(&stage.name) {
                        stages[i].state = StageState::Skipped {
                            reason: reason.clone(),
                        };
                    }
                }
                continue;
            }

            let outcome = match entry {
                crate::core::PlanEntry::Stage(stage) => {
                    self.deploy_stage(plan, stage, &mut state, &index, &mut stages)
                        .await
                }
                crate::core::PlanEntry::Wave(wave) => {
                    self.deploy_wave(plan, wave, &mut state, &index, &mut stages)
                        .await
                }
            };
            if let Err(walk_failure) = outcome {
                failure = Some(walk_failure);
            }
        }

        let status = if failure.is_some() {
            state.fail();
            ExecutionStatus::Failed
        } else {
            state.complete();
            ExecutionStatus::Completed
        };
        info!("Plan walk finished: {} - {:?}", plan.name, status);
        self.emit(ExecutionEvent::PlanCompleted {
            execution_id,
            status,
        });

        DeployReport {
            plan_name: plan.name.clone(),
            state,
            stages,
            failure,
        }
    }

    /// Deploy one sequential stage
    async fn deploy_stage(
        &self,
        plan: &PromotionPlan,
        stage: &Stage,
        state: &mut PlanState,
        index: &HashMap<String, usize>,
        stages: &mut [StageReport],
    ) -> Result<(), WalkFailure> {
        let started_at = Utc::now();
        self.emit(ExecutionEvent::StageStarted {
            stage: stage.name.clone(),
        });
        if let Some(&i) = index.get(&stage.name) {
            stages[i].state = StageState::Deploying { started_at };
        }

        let result = self.deployer.deploy(stage, &plan.resource).await;
        self.record_outcome(stage, started_at, result, state, index, stages)
    }

    /// Deploy every stage of a wave concurrently; the wave fails if any
    /// stage fails, after all in-flight stages have settled
    async fn deploy_wave(
        &self,
        plan: &PromotionPlan,
        wave: &Wave,
        state: &mut PlanState,
        index: &HashMap<String, usize>,
        stages: &mut [StageReport],
    ) -> Result<(), WalkFailure> {
        self.emit(ExecutionEvent::WaveStarted {
            wave: wave.name.clone(),
            stages: wave.stages.iter().map(|s| s.name.clone()).collect(),
        });

        let started_at = Utc::now();
        let mut set = JoinSet::new();
        for (position, stage) in wave.stages.iter().enumerate() {
            self.emit(ExecutionEvent::StageStarted {
                stage: stage.name.clone(),
            });
            if let Some(&i) = index.get(&stage.name) {
                stages[i].state = StageState::Deploying { started_at };
            }

            let deployer = Arc::clone(&self.deployer);
            let stage = stage.clone();
            let resource = plan.resource.clone();
            set.spawn(async move { (position, deployer.deploy(&stage, &resource).await) });
        }

        let mut outcomes: Vec<Option<Result<StageOutputs, DeployError>>> =
            (0..wave.stages.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((position, outcome)) => outcomes[position] = Some(outcome),
                Err(join_error) => {
                    warn!("deploy task for wave '{}' aborted: {}", wave.name, join_error);
                    if let Some(slot) = outcomes.iter_mut().find(|o| o.is_none()) {
                        *slot = Some(Err(DeployError::Backend {
                            stage: wave.name.clone(),
                            reason: join_error.to_string(),
                        }));
                    }
                }
            }
        }

        // Record outcomes in declaration order; keep the first failure
        let mut wave_failure = None;
        for (stage, outcome) in wave.stages.iter().zip(outcomes) {
            let result = outcome.unwrap_or_else(|| {
                Err(DeployError::Backend {
                    stage: stage.name.clone(),
                    reason: "deploy task produced no outcome".to_string(),
                })
            });
            if let Err(failure) =
                self.record_outcome(stage, started_at, result, state, index, stages)
            {
                wave_failure.get_or_insert(failure);
            }
        }

        match wave_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn record_outcome(
        &self,
        stage: &Stage,
        started_at: chrono::DateTime<Utc>,
        result: Result<StageOutputs, DeployError>,
        state: &mut PlanState,
        index: &HashMap<String, usize>,
        stages: &mut [StageReport],
    ) -> Result<(), WalkFailure> {
        match result {
            Ok(outputs) => {
                if let Some(&i) = index.get(&stage.name) {
                    stages[i].state = StageState::Deployed {
                        outputs: outputs.clone(),
                        started_at,
                        completed_at: Utc::now(),
                    };
                }
                state.deployed_stages += 1;
                self.emit(ExecutionEvent::StageDeployed {
                    stage: stage.name.clone(),
                    outputs,
                });
                Ok(())
            }
            Err(deploy_error) => {
                error!("Stage '{}' failed: {}", stage.name, deploy_error);
                if let Some(&i) = index.get(&stage.name) {
                    stages[i].state = StageState::Failed {
                        error: deploy_error.to_string(),
                        failed_at: Utc::now(),
                    };
                }
                state.failed_stages += 1;
                self.emit(ExecutionEvent::StageFailed {
                    stage: stage.name.clone(),
                    error: deploy_error.to_string(),
                });
                Err(WalkFailure::Stage {
                    stage: stage.name.clone(),
                    source: deploy_error,
                })
            }
        }
    }
}
