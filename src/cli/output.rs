//! CLI output formatting

use crate::{
    core::{ExecutionStatus, StageState},
    execution::ExecutionEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the plan's stages
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a stage state for display
pub fn format_stage_state(state: &StageState) -> String {
    match state {
        StageState::Pending => style("PENDING").dim().to_string(),
        StageState::Deploying { .. } => style("DEPLOYING").yellow().to_string(),
        StageState::Deployed { .. } => style("DEPLOYED").green().to_string(),
        StageState::Failed { .. } => style("FAILED").red().to_string(),
        StageState::Skipped { .. } => style("SKIPPED").dim().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Building => style("BUILDING").yellow().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event as a console line
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PlanStarted { plan_name, .. } => {
            format!("{} Starting plan: {}", ROCKET, style(plan_name).bold())
        }
        ExecutionEvent::BuildStarted { total_commands } => {
            format!("{} Build phase ({} commands)", INFO, total_commands)
        }
        ExecutionEvent::CommandCompleted { command } => {
            format!("{} {}", CHECK, style(command).dim())
        }
        ExecutionEvent::BuildFailed { command, error } => {
            format!("{} {} - {}", CROSS, style(command).bold(), style(error).red())
        }
        ExecutionEvent::StageStarted { stage } => {
            format!("{} Deploying stage {}", INFO, style(stage).bold())
        }
        ExecutionEvent::WaveStarted { wave, stages } => {
            format!(
                "{} Wave {} ({} stages in parallel)",
                INFO,
                style(wave).bold(),
                stages.len()
            )
        }
        ExecutionEvent::StageDeployed { stage, outputs } => {
            let outputs = outputs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} Stage {} deployed ({})",
                CHECK,
                style(stage).bold(),
                style(outputs).dim()
            )
        }
        ExecutionEvent::StageFailed { stage, error } => {
            format!(
                "{} Stage {} failed: {}",
                CROSS,
                style(stage).bold(),
                style(error).red()
            )
        }
        ExecutionEvent::PlanCompleted { status, .. } => {
            format!("{} Plan finished: {}", INFO, format_status(*status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageOutputs;

    #[test]
    fn test_format_stage_deployed_lists_outputs() {
        let mut outputs = StageOutputs::new();
        outputs.insert("LambdaArn", "arn:aws:lambda:us-east-1:111:function:f");

        let line = format_execution_event(&ExecutionEvent::StageDeployed {
            stage: "dev".to_string(),
            outputs,
        });
        assert!(line.contains("dev"));
        assert!(line.contains("LambdaArn="));
    }

    #[test]
    fn test_progress_bar_spans_stage_count() {
        let progress = create_progress_bar(3);
        assert_eq!(progress.length(), Some(3));
        progress.finish_and_clear();
    }

    #[test]
    fn test_format_build_failed_names_command() {
        let line = format_execution_event(&ExecutionEvent::BuildFailed {
            command: "npm run build".to_string(),
            error: "exited with exit status: 1".to_string(),
        });
        assert!(line.contains("npm run build"));
    }
}
