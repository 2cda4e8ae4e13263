//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Arguments shared by every command that assembles a plan
#[derive(Debug, Args, Clone)]
pub struct ManifestArgs {
    /// Path to the pipeline manifest YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Path to a context map file; entries override the manifest's
    /// embedded environments
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Fallback account for environments absent from the context map
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    pub default_account: Option<String>,

    /// Fallback region for environments absent from the context map
    #[arg(long, env = "CDK_DEFAULT_REGION")]
    pub default_region: Option<String>,
}

/// Assemble the plan and emit the synthesized artifact
#[derive(Debug, Args, Clone)]
pub struct SynthCommand {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Write the artifact to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Assemble the plan and report configuration errors
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Output the assembled plan in JSON format on success
    #[arg(long)]
    pub json: bool,
}

/// Build the artifact and walk the stages
#[derive(Debug, Args, Clone)]
pub struct DeployCommand {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Skip the build phase (artifact already produced)
    #[arg(long)]
    pub skip_build: bool,

    /// Walk the plan with simulated deployments instead of a real backend
    #[arg(long)]
    pub dry_run: bool,

    /// Skip source credential resolution
    #[arg(long)]
    pub no_credential: bool,
}
