use thiserror::Error;

/// The main error type for ordo operations
#[derive(Debug, Error)]
pub enum OrdoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while resolving or executing a task graph.
///
/// Every variant is terminal for the run that produced it.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("No tasks were requested")]
    NoTasksRequested,

    #[error("{}", describe_unknown(.name, .referenced_by.as_deref()))]
    UnknownTask {
        name: String,
        /// The task that listed `name` as a dependency, if any
        referenced_by: Option<String>,
    },

    #[error("Circular dependency detected: {}", describe_cycles(.cycles))]
    Cycle { cycles: Vec<Vec<String>> },

    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Task '{task}' failed: {error:#}")]
    TaskExecution { task: String, error: anyhow::Error },
}

impl GraphError {
    /// Name of the task this error is about, when there is exactly one
    pub fn task_name(&self) -> Option<&str> {
        match self {
            GraphError::UnknownTask { name, .. } => Some(name),
            GraphError::DuplicateTask(name) => Some(name),
            GraphError::TaskExecution { task, .. } => Some(task),
            GraphError::NoTasksRequested | GraphError::Cycle { .. } => None,
        }
    }
}

fn describe_unknown(name: &str, referenced_by: Option<&str>) -> String {
    match referenced_by {
        Some(parent) => format!("Task '{}' depends on '{}' which was not found", parent, name),
        None => format!("Task '{}' not found", name),
    }
}

/// Renders cycles as `a -> b -> a; c -> c`
pub fn describe_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut path = cycle.clone();
            if let Some(first) = path.first().cloned() {
                path.push(first);
            }
            path.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for ordo operations
pub type OrdoResult<T> = Result<T, OrdoError>;
