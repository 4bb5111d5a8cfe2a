//! Task model and registry
//!
//! A [`Task`] is a named unit of work with declared dependencies and an action.
//! Tasks are registered into a [`TaskGraph`] with ordinary function calls; the
//! graph keeps declaration order so that resolution is deterministic.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::GraphError;

/// The opaque work a task performs
pub type TaskAction = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A named unit of work
#[derive(Clone)]
pub struct Task {
    name: String,
    dependencies: Vec<String>,
    action: TaskAction,
    group: Option<String>,
    description: Option<String>,
}

impl Task {
    /// Create a task with no dependencies and a no-op action
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            action: Arc::new(|| Ok(())),
            group: None,
            description: None,
        }
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Arc::new(action);
        self
    }

    pub fn with_shared_action(mut self, action: TaskAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A cheap handle to the action, for running it off the current thread
    pub fn action(&self) -> TaskAction {
        Arc::clone(&self.action)
    }

    /// Invoke the action
    pub fn execute(&self) -> anyhow::Result<()> {
        (self.action)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("group", &self.group)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Explicit registry of tasks keyed by name
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Dependencies are not checked here; they may name tasks
    /// registered later.
    pub fn register(&mut self, task: Task) -> Result<(), GraphError> {
        if self.index.contains_key(task.name()) {
            return Err(GraphError::DuplicateTask(task.name().to_string()));
        }
        self.index.insert(task.name().to_string(), self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of the task in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Tasks in declaration order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
