//! Command execution utilities
//!
//! This module turns the `command` / `script` part of a task declaration into a task
//! action that launches an external process with consistent setup and error reporting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use colored::*;

use crate::configs::tasks::{Command as TaskCommand, TaskConfig};
use crate::task::TaskAction;
use crate::tasks::get_task_color;

/// Launches a task's external command from the workspace
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    task_name: String,
    workspace_root: PathBuf,
    working_dir: PathBuf,
    env: BTreeMap<String, String>,
}

impl CommandExecutor {
    pub fn new(workspace_root: &Path, task: &TaskConfig) -> Self {
        let working_dir = match &task.working_dir {
            Some(dir) => resolve_against(workspace_root, dir),
            None => workspace_root.to_path_buf(),
        };

        Self {
            task_name: task.name.clone(),
            workspace_root: workspace_root.to_path_buf(),
            working_dir,
            env: task.env.clone().unwrap_or_default(),
        }
    }

    /// Build the action for a task declaration, or `None` for aggregate tasks
    /// that only group their dependencies.
    pub fn action_for(workspace_root: &Path, task: &TaskConfig) -> Option<TaskAction> {
        let executor = Self::new(workspace_root, task);

        if let Some(script) = task.script.clone() {
            let action: TaskAction = Arc::new(move || executor.execute_script(&script));
            return Some(action);
        }

        let action: TaskAction = match task.command.clone()? {
            TaskCommand::Single(cmd) => Arc::new(move || executor.execute_shell_command(&cmd)),
            TaskCommand::Multiple(cmds) => Arc::new(move || {
                let Some((program, args)) = cmds.split_first() else {
                    bail!("Task '{}' has an empty command list", executor.task_name);
                };
                executor.execute_command_with_args(program, args)
            }),
        };
        Some(action)
    }

    /// Execute a command with common setup and error handling
    pub fn execute_command(&self, command: &mut Command, description: &str) -> anyhow::Result<()> {
        self.show_header(description);

        command.current_dir(&self.working_dir);
        command.env("ORDO_TASK", &self.task_name);
        command.envs(&self.env);

        let status = command
            .status()
            .with_context(|| format!("Failed to execute {}", description))?;

        if !status.success() {
            return Err(match status.code() {
                Some(code) => anyhow!("{} failed with exit code {}", description, code),
                None => anyhow!("{} was terminated by a signal", description),
            });
        }

        self.show_completion_message();
        Ok(())
    }

    /// Execute a script file
    pub fn execute_script(&self, script_path: &str) -> anyhow::Result<()> {
        let full_script_path = resolve_against(&self.workspace_root, script_path);

        if !full_script_path.exists() {
            bail!("Script file '{}' not found", full_script_path.display());
        }

        let mut command = Command::new(&full_script_path);
        self.execute_command(
            &mut command,
            &format!("script '{}'", full_script_path.display()),
        )
    }

    /// Execute a command with arguments
    pub fn execute_command_with_args(&self, program: &str, args: &[String]) -> anyhow::Result<()> {
        let mut command = Command::new(program);
        command.args(args);
        self.execute_command(&mut command, &format!("command '{}'", program))
    }

    /// Execute a single shell command
    pub fn execute_shell_command(&self, cmd: &str) -> anyhow::Result<()> {
        let mut command = if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.arg("/C");
            command
        } else {
            let mut command = Command::new("sh");
            command.arg("-c");
            command
        };
        command.arg(cmd);
        self.execute_command(&mut command, &format!("command '{}'", cmd))
    }

    fn show_header(&self, description: &str) {
        let task_color = get_task_color(&self.task_name);
        println!();
        println!(
            "┌─ {} {}",
            "Running".bold(),
            self.task_name.color(task_color).bold()
        );
        println!("└─ {}", description.bright_black());
    }

    fn show_completion_message(&self) {
        let task_color = get_task_color(&self.task_name);
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("Completed {}", self.task_name).color(task_color)
        );
    }
}

fn resolve_against(root: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_relative() {
        root.join(path)
    } else {
        path
    }
}
