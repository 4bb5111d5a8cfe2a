use anyhow::Result;
use colored::*;
use ordo_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    let result = manager.list_tasks();

    println!("{}", "Tasks".bold().underline());

    if result.groups.is_empty() {
        println!("  {}", "No tasks found".dimmed());
        return Ok(());
    }

    for (group, tasks) in &result.groups {
        println!();
        println!("{}", format!("{} tasks", group).bold());
        for task in tasks {
            let name = match result.task_colors.get(&task.name) {
                Some(color) => task.name.color(*color),
                None => task.name.normal(),
            };
            match &task.description {
                Some(description) => println!("  {} - {}", name, description.dimmed()),
                None => println!("  {}", name),
            }
        }
    }

    Ok(())
}
