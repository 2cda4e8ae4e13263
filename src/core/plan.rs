//! Promotion plan assembly - the ordered delivery topology

use crate::core::{
    build::BuildSpecification,
    config::{PipelineManifest, StageConfig, StageEntryConfig},
    environment::{self, ContextMap, EnvironmentDefaults},
    resource::FunctionResource,
    source::SourceReference,
    stage::{PlanEntry, Stage, Wave},
};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Stage name whose position anchors the ordering invariant
pub const DEV_STAGE: &str = "dev";
/// Stage name that must never be promoted ahead of [`DEV_STAGE`]
pub const PROD_STAGE: &str = "prod";

/// Configuration errors raised at assembly time, before any subprocess
/// or deployer call
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("manifest declares no stages")]
    NoStages,

    #[error("build specification has no commands")]
    EmptyBuild,

    #[error("source {field} must not be empty")]
    IncompleteSource { field: &'static str },

    #[error("credential secret name must not be empty")]
    EmptyCredential,

    #[error("no environment named '{environment}' in context map and no default target configured")]
    MissingContext { environment: String },

    #[error("environment '{environment}' is missing required field '{field}'")]
    MissingTargetField {
        environment: String,
        field: &'static str,
    },

    #[error("environment '{environment}' has malformed {field} '{value}'")]
    MalformedTargetField {
        environment: String,
        field: &'static str,
        value: String,
    },

    #[error("duplicate stage name '{name}'")]
    DuplicateStage { name: String },

    #[error("stage name must not be empty")]
    EmptyStageName,

    #[error("wave '{name}' contains no stages")]
    EmptyWave { name: String },

    #[error("stage '{stage}' targets account {account} but cross_account_keys is not enabled")]
    CrossAccountKeysRequired { stage: String, account: String },

    #[error("stage '{dev}' must be promoted before '{prod}' (declared at positions {dev_position} and {prod_position})")]
    DevAfterProd {
        dev: &'static str,
        prod: &'static str,
        dev_position: usize,
        prod_position: usize,
    },

    #[error("stages '{dev}' and '{prod}' must not share one promotion entry (position {position}); '{dev}' has to complete strictly before '{prod}' starts")]
    DevAlongsideProd {
        dev: &'static str,
        prod: &'static str,
        position: usize,
    },

    #[error("unsupported runtime '{runtime}'")]
    UnsupportedRuntime { runtime: String },

    #[error("handler '{handler}' is not in module.function form")]
    MalformedHandler { handler: String },

    #[error("handler '{handler}' does not match code artifact '{code}'")]
    HandlerMismatch { handler: String, code: String },

    #[error("resource output name must not be empty")]
    EmptyOutputName,
}

/// A fully assembled, validated promotion plan
///
/// Assembly is pure: identical inputs produce a structurally identical
/// plan, and the synthesized artifact carries no timestamps or ids, so
/// re-running synth is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionPlan {
    /// Pipeline name
    pub name: String,

    /// The single source trigger
    pub source: SourceReference,

    /// Build step; always precedes every stage
    pub build: BuildSpecification,

    /// The deployable unit instantiated once per stage
    pub resource: FunctionResource,

    /// Cross-account key material provisioning flag
    pub cross_account_keys: bool,

    /// Ordered promotion entries
    pub entries: Vec<PlanEntry>,
}

impl PromotionPlan {
    /// Assemble and validate a plan from a manifest
    ///
    /// `extra_context` overrides the manifest's embedded `environments`
    /// map entry-by-entry; `defaults` is the fallback target for
    /// environments absent from the merged map.
    pub fn assemble(
        manifest: &PipelineManifest,
        extra_context: &ContextMap,
        defaults: &EnvironmentDefaults,
    ) -> Result<Self, AssemblyError> {
        if !manifest.source.is_complete() {
            let field = if manifest.source.repository.trim().is_empty() {
                "repository"
            } else {
                "branch"
            };
            return Err(AssemblyError::IncompleteSource { field });
        }
        if manifest.source.credential.secret.trim().is_empty() {
            return Err(AssemblyError::EmptyCredential);
        }
        if manifest.build.is_empty() {
            return Err(AssemblyError::EmptyBuild);
        }
        if manifest.stages.is_empty() {
            return Err(AssemblyError::NoStages);
        }

        manifest.resource.validate()?;

        let mut context = manifest.environments.clone();
        context.extend(extra_context.clone());

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(manifest.stages.len());
        for entry in &manifest.stages {
            let entry = match entry {
                StageEntryConfig::Stage(config) => {
                    PlanEntry::Stage(Self::resolve_stage(config, &context, defaults, &mut seen)?)
                }
                StageEntryConfig::Wave(config) => {
                    if config.stages.is_empty() {
                        return Err(AssemblyError::EmptyWave {
                            name: config.name.clone(),
                        });
                    }
                    let stages = config
                        .stages
                        .iter()
                        .map(|s| Self::resolve_stage(s, &context, defaults, &mut seen))
                        .collect::<Result<Vec<_>, _>>()?;
                    PlanEntry::Wave(Wave {
                        name: config.name.clone(),
                        stages,
                    })
                }
            };
            entries.push(entry);
        }

        Self::check_promotion_order(&entries)?;
        Self::check_cross_account(manifest, &entries)?;

        Ok(PromotionPlan {
            name: manifest.name.clone(),
            source: manifest.source.clone(),
            build: manifest.build.clone(),
            resource: manifest.resource.clone(),
            cross_account_keys: manifest.cross_account_keys,
            entries,
        })
    }

    fn resolve_stage(
        config: &StageConfig,
        context: &ContextMap,
        defaults: &EnvironmentDefaults,
        seen: &mut HashSet<String>,
    ) -> Result<Stage, AssemblyError> {
        if config.name.trim().is_empty() {
            return Err(AssemblyError::EmptyStageName);
        }
        if !seen.insert(config.name.clone()) {
            return Err(AssemblyError::DuplicateStage {
                name: config.name.clone(),
            });
        }

        let target = environment::resolve(config.environment_name(), context, defaults)?;
        Ok(Stage {
            name: config.name.clone(),
            target,
        })
    }

    /// The dev stage must precede the prod wave whenever both exist
    fn check_promotion_order(entries: &[PlanEntry]) -> Result<(), AssemblyError> {
        let dev = entries.iter().position(|e| e.contains_stage(DEV_STAGE));
        let prod = entries.iter().position(|e| e.contains_stage(PROD_STAGE));

        if let (Some(dev_position), Some(prod_position)) = (dev, prod) {
            if dev_position == prod_position {
                return Err(AssemblyError::DevAlongsideProd {
                    dev: DEV_STAGE,
                    prod: PROD_STAGE,
                    position: dev_position,
                });
            }
            if prod_position < dev_position {
                return Err(AssemblyError::DevAfterProd {
                    dev: DEV_STAGE,
                    prod: PROD_STAGE,
                    dev_position,
                    prod_position,
                });
            }
        }
        Ok(())
    }

    /// Cross-account deployment requires key material provisioning
    fn check_cross_account(
        manifest: &PipelineManifest,
        entries: &[PlanEntry],
    ) -> Result<(), AssemblyError> {
        let Some(own_account) = manifest.pipeline_account.as_deref() else {
            return Ok(());
        };
        if manifest.cross_account_keys {
            return Ok(());
        }

        for entry in entries {
            for stage in entry.stages() {
                if stage.target.account != own_account {
                    return Err(AssemblyError::CrossAccountKeysRequired {
                        stage: stage.name.clone(),
                        account: stage.target.account.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// All stages in promotion order, waves flattened
    pub fn stages(&self) -> Vec<&Stage> {
        self.entries.iter().flat_map(|e| e.stages()).collect()
    }

    /// Stage names in promotion order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages().iter().map(|s| s.name.as_str()).collect()
    }

    /// Total number of stages across all entries
    pub fn stage_count(&self) -> usize {
        self.stages().len()
    }

    /// Emit the deployable plan artifact as pretty-printed JSON
    ///
    /// Deterministic for a given plan: field order is fixed by the
    /// struct definitions and all maps are ordered.
    pub fn synth(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
