use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ordo_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};

mod commands;
mod logging;

use logging::{LogFormat, LoggingConfig};

/// Ordo - A dependency-ordered task runner
#[derive(Parser)]
#[command(name = "ordo")]
#[command(about = "Run named tasks after everything they depend on")]
#[command(version)]
struct Cli {
    /// Path to the workspace root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Log filter, e.g. "debug" or "ordo_core=info" (falls back to ORDO_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks by group
    List,
    /// Show the execution order for tasks without running them
    Plan {
        /// Tasks to plan
        #[arg(required = true)]
        tasks: Vec<String>,
    },
    /// Run tasks and everything they depend on
    Run {
        /// Tasks to run
        #[arg(required = true)]
        tasks: Vec<String>,

        /// Number of tasks allowed to run at once (overrides the task file)
        #[arg(short = 'j', long)]
        workers: Option<usize>,
    },
    /// Show the task dependency graph
    Graph,
    /// Print the JSON schema of the task file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(LoggingConfig {
        filter: cli.log_level,
        format: cli.log_format,
    })?;

    if let Commands::Schema = cli.command {
        return commands::schema::execute();
    }

    let manager = WorkspaceManager::new(WorkspaceManagerConfig {
        workspace_root: cli.workspace,
    })
    .context("Failed to load workspace")?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::List => commands::list::execute(&manager),
        Commands::Plan { tasks } => commands::plan::execute(&manager, &tasks),
        Commands::Run { tasks, workers } => commands::run::execute(&manager, &tasks, workers).await,
        Commands::Graph => commands::graph::execute(&manager),
        Commands::Schema => commands::schema::execute(),
    }
}
