//! Leaf resource definition - the single deployable unit promoted
//! through every stage

use crate::core::plan::AssemblyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime tags accepted by the managed function execution environment
pub const SUPPORTED_RUNTIMES: &[&str] = &[
    "python3.11",
    "python3.12",
    "python3.13",
    "nodejs18.x",
    "nodejs20.x",
    "nodejs22.x",
];

/// A serverless function with a fixed runtime, entry point, and code
/// artifact reference
///
/// The definition performs no logic of its own; correctness is
/// structural: the handler must name the artifact's module, and the
/// runtime must be one the execution platform supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResource {
    /// Runtime version tag, e.g. `python3.12`
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Entry point in `module.function` form
    #[serde(default = "default_handler")]
    pub handler: String,

    /// Path to the code artifact (opaque reference, never inline text)
    #[serde(default = "default_code")]
    pub code: String,

    /// Name under which the assigned function identifier is exported
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_runtime() -> String {
    "python3.12".to_string()
}

fn default_handler() -> String {
    "index.handler".to_string()
}

fn default_code() -> String {
    "lambda/index.py".to_string()
}

fn default_output() -> String {
    "LambdaArn".to_string()
}

impl Default for FunctionResource {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            handler: default_handler(),
            code: default_code(),
            output: default_output(),
        }
    }
}

impl FunctionResource {
    /// Structural validation: supported runtime, well-formed handler,
    /// handler module matching the code artifact
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if !SUPPORTED_RUNTIMES.contains(&self.runtime.as_str()) {
            return Err(AssemblyError::UnsupportedRuntime {
                runtime: self.runtime.clone(),
            });
        }

        let module = match self.handler.split_once('.') {
            Some((module, function)) if !module.is_empty() && !function.is_empty() => module,
            _ => {
                return Err(AssemblyError::MalformedHandler {
                    handler: self.handler.clone(),
                })
            }
        };

        let stem = Path::new(&self.code)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if stem != module {
            return Err(AssemblyError::HandlerMismatch {
                handler: self.handler.clone(),
                code: self.code.clone(),
            });
        }

        if self.output.trim().is_empty() {
            return Err(AssemblyError::EmptyOutputName);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resource_validates() {
        FunctionResource::default().validate().unwrap();
    }

    #[test]
    fn test_unsupported_runtime_rejected() {
        let resource = FunctionResource {
            runtime: "python2.7".to_string(),
            ..Default::default()
        };
        let err = resource.validate().unwrap_err();
        assert!(err.to_string().contains("python2.7"));
    }

    #[test]
    fn test_handler_must_name_artifact_module() {
        let resource = FunctionResource {
            handler: "app.handler".to_string(),
            code: "lambda/index.py".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resource.validate().unwrap_err(),
            AssemblyError::HandlerMismatch { .. }
        ));
    }

    #[test]
    fn test_handler_without_function_part_rejected() {
        let resource = FunctionResource {
            handler: "index".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            resource.validate().unwrap_err(),
            AssemblyError::MalformedHandler { .. }
        ));
    }

    #[test]
    fn test_node_artifact_accepted() {
        let resource = FunctionResource {
            runtime: "nodejs20.x".to_string(),
            handler: "index.handler".to_string(),
            code: "lambda/index.js".to_string(),
            output: "LambdaArn".to_string(),
        };
        resource.validate().unwrap();
    }
}
