use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{OrdoError, OrdoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    /// Run through the platform shell
    Single(String),
    /// Program followed by its arguments, spawned directly
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    pub description: Option<String>,
    /// Informational label used when listing tasks
    pub group: Option<String>,
    pub depends_on: Option<Vec<String>>,
    pub command: Option<Command>,
    pub script: Option<String>,
    /// Directory the command runs in, relative to the workspace root
    pub working_dir: Option<String>,
    pub env: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TasksFileConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Default number of tasks allowed to run at once
    pub workers: Option<usize>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

pub fn parse_tasks_config(yaml_str: &str) -> OrdoResult<TasksFileConfig> {
    let config: TasksFileConfig = serde_yaml::from_str(yaml_str)?;

    for task in &config.tasks {
        if task.command.is_some() && task.script.is_some() {
            return Err(OrdoError::Config(format!(
                "Task '{}' declares both a command and a script",
                task.name
            )));
        }
        if matches!(&task.command, Some(Command::Multiple(args)) if args.is_empty()) {
            return Err(OrdoError::Config(format!(
                "Task '{}' declares an empty command list",
                task.name
            )));
        }
    }

    Ok(config)
}

/// Pretty-printed JSON schema for task files
pub fn tasks_config_schema() -> OrdoResult<String> {
    let schema = schemars::schema_for!(TasksFileConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| OrdoError::Config(format!("Failed to render task schema: {}", e)))
}
