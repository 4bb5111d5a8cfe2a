//! Task execution module
//!
//! This module handles dependency resolution, the task graph runner, and the
//! command actions that tasks declared in configuration files perform.

pub mod command;
pub mod dependencies;
pub mod runner;

pub use command::CommandExecutor;
pub use dependencies::{find_cycles, resolve_execution_order};
pub use runner::{run, TaskRunner, TaskRunnerConfig};
