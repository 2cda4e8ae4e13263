use anyhow::{Context, Result};
use stagehand::cli::commands::{DeployCommand, ManifestArgs, SynthCommand, ValidateCommand};
use stagehand::cli::output::*;
use stagehand::cli::{Cli, Command};
use stagehand::core::{ContextMap, EnvironmentDefaults, PipelineManifest, PromotionPlan};
use stagehand::execution::{DryRunDeployer, ExecutionEngine, ExecutionEvent, ExecutionOptions};
use stagehand::secrets::{EnvSecretStore, SecretStore};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Synth(cmd) => synth_plan(cmd)?,
        Command::Validate(cmd) => validate_plan(cmd)?,
        Command::Deploy(cmd) => deploy_plan(cmd).await?,
    }

    Ok(())
}

/// Load the manifest and assemble the promotion plan from it
fn assemble(args: &ManifestArgs) -> Result<PromotionPlan> {
    let manifest = PipelineManifest::from_file(&args.file)
        .context("Failed to load pipeline manifest")?;

    let extra_context = match &args.context {
        Some(path) => stagehand::core::environment::load_context_file(path)?,
        None => ContextMap::new(),
    };
    let defaults = EnvironmentDefaults::new(
        args.default_account.clone(),
        args.default_region.clone(),
    );

    let plan = PromotionPlan::assemble(&manifest, &extra_context, &defaults)
        .context("Failed to assemble promotion plan")?;
    Ok(plan)
}

fn synth_plan(cmd: &SynthCommand) -> Result<()> {
    let plan = assemble(&cmd.manifest)?;
    let artifact = plan.synth()?;

    match &cmd.out {
        Some(path) => {
            std::fs::write(path, &artifact)
                .with_context(|| format!("Failed to write artifact to {}", path.display()))?;
            println!(
                "{} Synthesized {} to {}",
                CHECK,
                style(&plan.name).bold(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", artifact),
    }
    Ok(())
}

fn validate_plan(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating manifest...", INFO);

    match assemble(&cmd.manifest) {
        Ok(plan) => {
            println!("{} Promotion plan is valid!", CHECK);
            println!("  Name: {}", style(&plan.name).bold());
            println!("  Source: {}", style(&plan.source.repository).cyan());
            println!("  Build commands: {}", style(plan.build.len()).cyan());
            println!("  Stages: {}", style(plan.stage_names().join(" -> ")).cyan());

            if cmd.json {
                println!("\n{}", plan.synth()?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

async fn deploy_plan(cmd: &DeployCommand) -> Result<()> {
    if !cmd.dry_run {
        anyhow::bail!(
            "no deployer backend is configured yet; re-run with --dry-run \
             to walk the plan with simulated deployments"
        );
    }

    let plan = assemble(&cmd.manifest)?;

    println!(
        "{} Loaded plan: {} ({} stages)",
        INFO,
        style(&plan.name).bold(),
        style(plan.stage_count()).cyan()
    );
    if cmd.skip_build {
        println!("{} Skipping build phase", WARN);
    }

    // Resolve the source credential up front; a missing secret is a
    // configuration error and nothing may run after it
    if !cmd.no_credential {
        let credential = &plan.source.credential;
        let store = EnvSecretStore::new();
        store
            .resolve(&credential.secret, &credential.field)
            .await
            .context("Failed to resolve source credential")?;
        println!(
            "{} Source credential {} resolved",
            CHECK,
            style(&credential.secret).cyan()
        );
    }

    let mut engine = ExecutionEngine::new(DryRunDeployer::new());
    let progress = create_progress_bar(plan.stage_count());
    let bar = progress.clone();
    engine.add_event_handler(move |event| {
        if matches!(
            event,
            ExecutionEvent::StageDeployed { .. } | ExecutionEvent::StageFailed { .. }
        ) {
            bar.inc(1);
        }
        bar.println(format_execution_event(&event));
    });

    let options = ExecutionOptions {
        skip_build: cmd.skip_build,
    };
    println!();
    let report = engine.execute(&plan, &options).await;
    progress.finish_and_clear();

    // Print exported outputs per deployed stage
    for stage in &report.stages {
        if let Some(outputs) = report.outputs(&stage.name) {
            for (name, value) in outputs.iter() {
                println!(
                    "  {}.{} = {}",
                    style(&stage.name).bold(),
                    style(name).cyan(),
                    value
                );
            }
        }
    }

    if report.succeeded() {
        println!(
            "\n{} {} completed {}",
            CHECK,
            style(&plan.name).bold(),
            style("successfully").green()
        );
        Ok(())
    } else {
        println!(
            "\n{} {} {}",
            CROSS,
            style(&plan.name).bold(),
            style("failed").red()
        );
        if let Some(failure) = &report.failure {
            tracing::error!("{}", failure);
        }
        std::process::exit(1);
    }
}
