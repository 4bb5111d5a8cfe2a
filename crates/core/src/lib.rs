//! Ordo Core Library
//!
//! This is the core library for the ordo task runner. It provides the task model,
//! dependency resolution, the task graph runner, task file parsing and command
//! actions.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`task`] - Task model and the explicit task registry
//! - [`execution`] - Dependency resolution, the runner, and command actions
//! - [`workspace_manager`] - High-level interface over a workspace's task files
//! - [`configs`] - Task file parsing and schema
//! - [`tasks`] - Terminal color management for task output
//! - [`results`] - Execution records and result types
//! - [`types`] - Error types and type aliases
//!
//! ## Usage
//!
//! Tasks can be registered and run directly:
//!
//! ```rust
//! use ordo_core::execution::run;
//! use ordo_core::task::{Task, TaskGraph};
//!
//! # fn example() -> Result<(), ordo_core::GraphError> {
//! let mut graph = TaskGraph::new();
//! graph.register(Task::new("createZipJars").with_action(|| Ok(())))?;
//! graph.register(Task::new("createZipSource").with_action(|| Ok(())))?;
//! graph.register(Task::new("dist").depends_on(["createZipJars", "createZipSource"]))?;
//!
//! let report = run(&graph, &["dist"])?;
//! assert_eq!(report.order(), vec!["createZipJars", "createZipSource", "dist"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod configs;
pub mod execution;
pub mod results;
pub mod task;
pub mod tasks;
pub mod types;
pub mod workspace_manager;

// Re-export the main types for easier usage
pub use task::{Task, TaskAction, TaskGraph};
pub use types::{GraphError, OrdoError, OrdoResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
