//! Result types for runner and workspace operations
//!
//! This module contains all result types returned by the runner and the workspace
//! manager, providing a centralized location for output structures.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use colored::Color;

/// Lifecycle of a single task within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
}

/// A task whose action completed successfully
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub name: String,
    pub duration: Duration,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Tasks in the order their actions finished
    pub completed: Vec<TaskOutcome>,
    /// Final state of every task in the closure
    pub states: HashMap<String, TaskState>,
}

impl ExecutionReport {
    /// Names of the completed tasks, in completion order
    pub fn order(&self) -> Vec<&str> {
        self.completed.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn state(&self, name: &str) -> Option<TaskState> {
        self.states.get(name).copied()
    }

    pub fn total_duration(&self) -> Duration {
        self.completed.iter().map(|o| o.duration).sum()
    }
}

/// What a run would execute, without running anything
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub requested: Vec<String>,
    pub order: Vec<String>,
}

/// Summary of a registered task for listing
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
}

/// Result of listing tasks in the workspace
#[derive(Debug)]
pub struct TaskListResult {
    /// Tasks keyed by group label, each list sorted by name
    pub groups: BTreeMap<String, Vec<TaskInfo>>,
    pub task_colors: HashMap<String, Color>,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: petgraph::Graph<String, ()>,
    pub cycles: Vec<Vec<String>>,
}
