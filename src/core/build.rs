//! Build specification domain model

use serde::{Deserialize, Serialize};

/// Ordered list of shell commands that turns the source into a
/// deployable artifact
///
/// The build always precedes every stage in the promotion plan, and any
/// command exiting non-zero halts the pipeline before any stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpecification {
    /// Commands executed in declaration order
    #[serde(default = "default_commands")]
    pub commands: Vec<String>,
}

fn default_commands() -> Vec<String> {
    vec![
        "npm ci".to_string(),
        "npm run build".to_string(),
        "npx cdk synth".to_string(),
    ]
}

impl Default for BuildSpecification {
    fn default() -> Self {
        Self {
            commands: default_commands(),
        }
    }
}

impl BuildSpecification {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_build_commands() {
        let build = BuildSpecification::default();
        assert_eq!(
            build.commands,
            vec!["npm ci", "npm run build", "npx cdk synth"]
        );
    }

    #[test]
    fn test_explicit_commands_replace_defaults() {
        let yaml = r#"
commands:
  - "cargo build --release"
"#;
        let build: BuildSpecification = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(build.commands, vec!["cargo build --release"]);
    }
}
