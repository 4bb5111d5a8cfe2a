//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for all workspace operations. It loads the task files of a workspace, registers every
//! declared task into a [`TaskGraph`], and exposes listing, planning, graphing and
//! running on top of it.
//!
//! Task files are read from `<root>/ordo.yml` and then from `<root>/.ordo/tasks/*.yml`
//! in file-name order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ordo_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> ordo_core::types::OrdoResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//! })?;
//!
//! let plan = manager.get_execution_plan(&["dist"])?;
//! let report = manager.run_tasks(&["dist"], None).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use colored::Color;
use tracing::debug;

use crate::configs::tasks::{parse_tasks_config, tasks_config_schema, TasksFileConfig};
use crate::execution::command::CommandExecutor;
use crate::execution::dependencies::{build_petgraph, cycles_in, resolve_execution_order};
use crate::execution::runner::{TaskRunner, TaskRunnerConfig};
use crate::results::{DependencyGraphResult, ExecutionPlan, ExecutionReport, TaskInfo, TaskListResult};
use crate::task::{Task, TaskGraph};
use crate::tasks::get_task_color;
use crate::types::{OrdoError, OrdoResult};

/// File name of the root task file
pub const TASKS_FILE: &str = "ordo.yml";

/// Group under which tasks without a group label are listed
pub const DEFAULT_GROUP: &str = "other";

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    pub root: PathBuf,
    pub task_configs: TasksFileConfig,
    pub graph: TaskGraph,
}

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    pub workspace_root: PathBuf,
}

impl WorkspaceManager {
    /// Initialize a new workspace manager from the given workspace root
    pub fn new(config: WorkspaceManagerConfig) -> OrdoResult<Self> {
        let task_configs = Self::load_task_configs(&config.workspace_root)?;
        let graph = Self::build_task_graph(&config.workspace_root, &task_configs)?;

        debug!(
            root = %config.workspace_root.display(),
            tasks = graph.len(),
            "loaded workspace"
        );

        Ok(Self {
            root: config.workspace_root,
            task_configs,
            graph,
        })
    }

    /// List all tasks grouped by their group label
    pub fn list_tasks(&self) -> TaskListResult {
        let mut groups: BTreeMap<String, Vec<TaskInfo>> = BTreeMap::new();

        for task in self.graph.tasks() {
            let group = task.group().unwrap_or(DEFAULT_GROUP).to_string();
            groups.entry(group).or_default().push(TaskInfo {
                name: task.name().to_string(),
                description: task.description().map(str::to_string),
                dependencies: task.dependencies().to_vec(),
            });
        }

        for tasks in groups.values_mut() {
            tasks.sort_by(|a, b| a.name.cmp(&b.name));
        }

        TaskListResult {
            groups,
            task_colors: self.get_task_colors(),
        }
    }

    /// Get the execution order for the requested tasks without running them
    pub fn get_execution_plan<S: AsRef<str>>(&self, requested: &[S]) -> OrdoResult<ExecutionPlan> {
        let order = resolve_execution_order(&self.graph, requested)?;
        Ok(ExecutionPlan {
            requested: requested.iter().map(|s| s.as_ref().to_string()).collect(),
            order,
        })
    }

    /// Run the requested tasks. `workers` overrides the task file's setting.
    pub async fn run_tasks<S: AsRef<str>>(
        &self,
        requested: &[S],
        workers: Option<usize>,
    ) -> OrdoResult<ExecutionReport> {
        let config = TaskRunnerConfig {
            workers: workers.or(self.task_configs.workers).unwrap_or(1),
        };

        let report = TaskRunner::with_config(&self.graph, config)
            .run(requested)
            .await?;
        Ok(report)
    }

    /// Get dependency graph information for every registered task
    pub fn get_dependency_graph(&self) -> DependencyGraphResult {
        let graph = build_petgraph(&self.graph, self.graph.tasks().map(Task::name));
        let cycles = cycles_in(&graph);
        DependencyGraphResult { graph, cycles }
    }

    /// JSON schema describing the task file format
    pub fn task_schema() -> OrdoResult<String> {
        tasks_config_schema()
    }

    pub fn get_task_colors(&self) -> HashMap<String, Color> {
        self.graph
            .tasks()
            .map(|task| (task.name().to_string(), get_task_color(task.name())))
            .collect()
    }

    // Private helper methods

    fn load_task_configs(workspace_root: &Path) -> OrdoResult<TasksFileConfig> {
        let root_file = workspace_root.join(TASKS_FILE);
        if !root_file.exists() {
            return Err(OrdoError::Config(format!(
                "No {} found in {}",
                TASKS_FILE,
                workspace_root.display()
            )));
        }

        let mut merged = Self::load_task_file(&root_file)?;

        let tasks_dir = workspace_root.join(".ordo").join("tasks");
        if tasks_dir.exists() {
            let mut paths = Vec::new();
            for entry in std::fs::read_dir(&tasks_dir).map_err(|e| {
                OrdoError::Config(format!(
                    "Failed to read tasks directory {}: {}",
                    tasks_dir.display(),
                    e
                ))
            })? {
                let entry = entry
                    .map_err(|e| OrdoError::Config(format!("Failed to read directory entry: {}", e)))?;
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) == Some("yml") {
                    paths.push(path);
                }
            }
            paths.sort();

            for path in paths {
                let config = Self::load_task_file(&path)?;
                merged.tasks.extend(config.tasks);
                if config.workers.is_some() {
                    merged.workers = config.workers;
                }
            }
        }

        Ok(merged)
    }

    fn load_task_file(path: &Path) -> OrdoResult<TasksFileConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrdoError::Config(format!("Failed to read task config {}: {}", path.display(), e))
        })?;

        parse_tasks_config(&content).map_err(|e| {
            OrdoError::Config(format!("Failed to parse task config {}: {}", path.display(), e))
        })
    }

    fn build_task_graph(workspace_root: &Path, config: &TasksFileConfig) -> OrdoResult<TaskGraph> {
        let mut graph = TaskGraph::new();

        for task_config in &config.tasks {
            let mut task = Task::new(task_config.name.clone())
                .depends_on(task_config.depends_on.iter().flatten().cloned());
            if let Some(group) = &task_config.group {
                task = task.with_group(group.clone());
            }
            if let Some(description) = &task_config.description {
                task = task.with_description(description.clone());
            }
            if let Some(action) = CommandExecutor::action_for(workspace_root, task_config) {
                task = task.with_shared_action(action);
            }
            graph.register(task)?;
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphError;

    const ROOT_TASKS: &str = r#"
name: example
tasks:
  - name: createZipJars
    group: distribution
    description: Creates a .zip file with the project jars
    dependsOn: [shadowJar]
  - name: createZipSource
    group: distribution
    description: Creates a .zip with the project source code
  - name: dist
    group: distribution
    dependsOn: [createZipJars, createZipSource]
"#;

    const BUILD_TASKS: &str = r#"
workers: 3
tasks:
  - name: shadowJar
    group: build
"#;

    fn workspace_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(full, content).unwrap();
        }
        dir
    }

    fn manager_for(dir: &tempfile::TempDir) -> OrdoResult<WorkspaceManager> {
        WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: dir.path().to_path_buf(),
        })
    }

    #[test]
    fn test_missing_tasks_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager_for(&dir).err().unwrap();
        assert!(matches!(err, OrdoError::Config(ref msg) if msg.contains("ordo.yml")));
    }

    #[test]
    fn test_task_files_are_merged() {
        let dir = workspace_with(&[
            ("ordo.yml", ROOT_TASKS),
            (".ordo/tasks/build.yml", BUILD_TASKS),
        ]);

        let manager = manager_for(&dir).unwrap();

        assert_eq!(manager.graph.len(), 4);
        assert_eq!(manager.task_configs.workers, Some(3));
    }

    #[test]
    fn test_plan_orders_dependencies_first() {
        let dir = workspace_with(&[
            ("ordo.yml", ROOT_TASKS),
            (".ordo/tasks/build.yml", BUILD_TASKS),
        ]);
        let manager = manager_for(&dir).unwrap();

        let plan = manager.get_execution_plan(&["dist"]).unwrap();

        assert_eq!(plan.requested, vec!["dist"]);
        assert_eq!(
            plan.order,
            vec!["shadowJar", "createZipJars", "createZipSource", "dist"]
        );
    }

    #[test]
    fn test_plan_reports_unknown_dependency() {
        let dir = workspace_with(&[("ordo.yml", ROOT_TASKS)]);
        let manager = manager_for(&dir).unwrap();

        let err = manager.get_execution_plan(&["dist"]).unwrap_err();

        assert!(matches!(
            err,
            OrdoError::Graph(GraphError::UnknownTask { ref name, .. }) if name == "shadowJar"
        ));
    }

    #[test]
    fn test_duplicate_task_across_files() {
        let dir = workspace_with(&[
            ("ordo.yml", "tasks:\n  - name: build\n"),
            (".ordo/tasks/more.yml", "tasks:\n  - name: build\n"),
        ]);

        let err = manager_for(&dir).err().unwrap();
        assert!(matches!(err, OrdoError::Graph(GraphError::DuplicateTask(ref name)) if name == "build"));
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = workspace_with(&[("ordo.yml", "tasks: [")]);

        let err = manager_for(&dir).err().unwrap();
        assert!(err.to_string().contains("Failed to parse task config"));
    }

    #[test]
    fn test_empty_command_list_fails_loading() {
        let dir = workspace_with(&[("ordo.yml", "tasks:\n  - name: zip\n    command: []\n")]);

        let err = manager_for(&dir).err().unwrap();
        assert!(err.to_string().contains("empty command list"));
    }

    #[test]
    fn test_list_tasks_groups_and_sorts() {
        let dir = workspace_with(&[
            ("ordo.yml", ROOT_TASKS),
            (".ordo/tasks/build.yml", BUILD_TASKS),
            (".ordo/tasks/misc.yml", "tasks:\n  - name: clean\n"),
        ]);
        let manager = manager_for(&dir).unwrap();

        let result = manager.list_tasks();

        let groups: Vec<_> = result.groups.keys().map(String::as_str).collect();
        assert_eq!(groups, vec!["build", "distribution", "other"]);
        let distribution: Vec<_> = result.groups["distribution"]
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(distribution, vec!["createZipJars", "createZipSource", "dist"]);
        assert_eq!(result.task_colors.len(), 5);
    }

    #[test]
    fn test_dependency_graph_reports_cycles() {
        let dir = workspace_with(&[(
            "ordo.yml",
            "tasks:\n  - name: a\n    dependsOn: [b]\n  - name: b\n    dependsOn: [a]\n  - name: c\n",
        )]);
        let manager = manager_for(&dir).unwrap();

        let result = manager.get_dependency_graph();

        assert_eq!(result.graph.node_count(), 3);
        assert_eq!(result.graph.edge_count(), 2);
        assert_eq!(result.cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tasks_executes_commands_in_order() {
        let dir = workspace_with(&[(
            "ordo.yml",
            r#"
tasks:
  - name: first
    command: echo first >> log.txt
  - name: second
    dependsOn: [first]
    command: echo second >> log.txt
  - name: dist
    dependsOn: [second]
"#,
        )]);
        let manager = manager_for(&dir).unwrap();

        let report = manager.run_tasks(&["dist"], None).await.unwrap();

        assert_eq!(report.order(), vec!["first", "second", "dist"]);
        let log = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_tasks_stops_at_failing_command() {
        let dir = workspace_with(&[(
            "ordo.yml",
            r#"
workers: 2
tasks:
  - name: broken
    command: exit 1
  - name: after
    dependsOn: [broken]
    command: touch after.txt
"#,
        )]);
        let manager = manager_for(&dir).unwrap();

        let err = manager.run_tasks(&["after"], None).await.unwrap_err();

        assert!(matches!(
            err,
            OrdoError::Graph(GraphError::TaskExecution { ref task, .. }) if task == "broken"
        ));
        assert!(!dir.path().join("after.txt").exists());
    }
}
