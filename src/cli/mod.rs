//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{DeployCommand, SynthCommand, ValidateCommand};
use std::ffi::OsString;

/// Staged promotion pipeline tool
#[derive(Debug, Parser, Clone)]
#[command(name = "stagehand")]
#[command(author = "Stagehand Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Assemble, synth and walk staged promotion plans", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Assemble the plan and emit the synthesized artifact
    Synth(SynthCommand),

    /// Assemble the plan and report configuration errors
    Validate(ValidateCommand),

    /// Build the artifact and walk the stages
    Deploy(DeployCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
