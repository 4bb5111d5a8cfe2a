use anyhow::Result;
use colored::*;
use ordo_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager, tasks: &[String]) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), tasks.join(", ").cyan());

    let execution_plan = manager
        .get_execution_plan(tasks)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    println!("\n{}:", "Execution order".bold());
    for (i, task) in execution_plan.order.iter().enumerate() {
        if execution_plan.requested.contains(task) {
            println!("  {}. {}", i + 1, task.bold());
        } else {
            println!("  {}. {}", i + 1, task);
        }
    }

    Ok(())
}
