//! Stages, waves, and the ordered entries of a promotion plan

use crate::core::environment::EnvironmentTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named promotion unit bound to one environment target
///
/// Each stage instantiates its own copy of the resource graph; no state
/// is shared between two stage instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Declared stage identifier; also the name surfaced in the plan
    pub name: String,

    /// Fully resolved deployment destination
    pub target: EnvironmentTarget,
}

/// A set of stages promoted concurrently, strictly ordered against
/// neighboring entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub name: String,
    pub stages: Vec<Stage>,
}

/// One entry of the promotion order
///
/// Registration order is promotion order: entries execute strictly
/// left-to-right, and a wave does not begin until all prior entries
/// completed successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanEntry {
    Stage(Stage),
    Wave(Wave),
}

impl PlanEntry {
    /// All stages contained in this entry, in declaration order
    pub fn stages(&self) -> Vec<&Stage> {
        match self {
            PlanEntry::Stage(stage) => vec![stage],
            PlanEntry::Wave(wave) => wave.stages.iter().collect(),
        }
    }

    /// Whether any contained stage carries the given name
    pub fn contains_stage(&self, name: &str) -> bool {
        self.stages().iter().any(|s| s.name == name)
    }

    /// Display label for logs and events
    pub fn label(&self) -> &str {
        match self {
            PlanEntry::Stage(stage) => &stage.name,
            PlanEntry::Wave(wave) => &wave.name,
        }
    }
}

/// Named output values surfaced after a stage completes
///
/// Read-only to downstream consumers; a BTreeMap keeps serialization
/// order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutputs(BTreeMap<String, String>);

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&String> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
