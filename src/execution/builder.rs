//! Build runner - executes the build specification as subprocesses

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// A build command that halted the pipeline
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build command '{command}' exited with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("build command '{command}' could not be spawned: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// The command the error names
    pub fn command(&self) -> &str {
        match self {
            BuildError::CommandFailed { command, .. } => command,
            BuildError::Spawn { command, .. } => command,
        }
    }
}

/// Runs build commands one at a time through a shell
#[derive(Debug, Clone)]
pub struct BuildRunner {
    shell: String,
}

impl BuildRunner {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Run a single command; non-zero exit is an error naming the
    /// command
    pub async fn run_command(&self, command: &str) -> Result<(), BuildError> {
        info!(command, "running build command");
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .status()
            .await
            .map_err(|source| BuildError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::CommandFailed {
                command: command.to_string(),
                status,
            });
        }
        debug!(command, "build command succeeded");
        Ok(())
    }
}

impl Default for BuildRunner {
    fn default() -> Self {
        Self::new()
    }
}
