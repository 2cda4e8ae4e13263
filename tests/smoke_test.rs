//! Smoke test - ensures basic plan assembly and walking works
//! end-to-end with the built-in dry-run deployer
//!
//! Run with: cargo test smoke_test

mod helpers;

use helpers::*;
use stagehand::execution::{ExecutionEngine, ExecutionEvent, ExecutionOptions};
use stagehand::DryRunDeployer;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn smoke_test_dev_prod_walk() {
    let plan = assemble_yaml(DEV_PROD_MANIFEST);

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut engine = ExecutionEngine::new(DryRunDeployer::new());
    engine.add_event_handler(move |event| {
        let label = match event {
            ExecutionEvent::PlanStarted { .. } => "plan-started".to_string(),
            ExecutionEvent::BuildStarted { .. } => "build-started".to_string(),
            ExecutionEvent::CommandCompleted { command } => format!("command:{}", command),
            ExecutionEvent::BuildFailed { .. } => "build-failed".to_string(),
            ExecutionEvent::StageStarted { stage } => format!("stage-started:{}", stage),
            ExecutionEvent::WaveStarted { wave, .. } => format!("wave-started:{}", wave),
            ExecutionEvent::StageDeployed { stage, .. } => format!("stage-deployed:{}", stage),
            ExecutionEvent::StageFailed { stage, .. } => format!("stage-failed:{}", stage),
            ExecutionEvent::PlanCompleted { .. } => "plan-completed".to_string(),
        };
        sink.lock().unwrap().push(label);
    });

    let report = engine.execute(&plan, &ExecutionOptions::default()).await;
    assert!(report.succeeded());

    // Exported output per environment
    assert_eq!(
        report.outputs("dev").unwrap().get("LambdaArn").unwrap(),
        "arn:aws:lambda:us-east-1:111:function:dev-function"
    );
    assert_eq!(
        report.outputs("prod").unwrap().get("LambdaArn").unwrap(),
        "arn:aws:lambda:us-west-2:222:function:prod-function"
    );

    // Event stream respects the promotion order
    let events = events.lock().unwrap().clone();
    let position = |label: &str| {
        events
            .iter()
            .position(|e| e == label)
            .unwrap_or_else(|| panic!("missing event {}", label))
    };
    assert_eq!(position("plan-started"), 0);
    assert!(position("build-started") < position("stage-started:dev"));
    assert!(position("stage-deployed:dev") < position("wave-started:prod"));
    assert!(position("wave-started:prod") < position("stage-deployed:prod"));
    assert!(position("stage-deployed:prod") < position("plan-completed"));
}
