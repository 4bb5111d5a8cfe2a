use anyhow::Result;
use colored::*;
use ordo_core::tasks::get_task_color;
use ordo_core::workspace_manager::WorkspaceManager;
use tracing::debug;

pub async fn execute(
    manager: &WorkspaceManager,
    tasks: &[String],
    workers: Option<usize>,
) -> Result<()> {
    println!("{} {}", "Running".bold(), tasks.join(", ").cyan());
    debug!(?workers, "worker override from command line");

    let report = manager
        .run_tasks(tasks, workers)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run tasks: {}", e))?;

    println!();
    println!("{}", "Summary".bold().underline());
    for outcome in &report.completed {
        println!(
            "  {} {} {}",
            "✓".green(),
            outcome.name.color(get_task_color(&outcome.name)),
            format!("({:.2?})", outcome.duration).dimmed()
        );
    }

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        format!(
            "All {} tasks completed successfully in {:.2?}",
            report.completed.len(),
            report.total_duration()
        )
        .green()
        .bold()
    );

    Ok(())
}
