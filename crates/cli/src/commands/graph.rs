use anyhow::Result;
use colored::*;
use ordo_core::types::describe_cycles;
use ordo_core::workspace_manager::WorkspaceManager;

pub fn execute(manager: &WorkspaceManager) -> Result<()> {
    println!("{}", "Task Dependency Graph:".bold().underline());

    let result = manager.get_dependency_graph();
    let graph = &result.graph;

    if graph.node_count() == 0 {
        println!("No tasks defined");
        return Ok(());
    }

    if !result.cycles.is_empty() {
        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!(
                "Circular dependencies detected: {}",
                describe_cycles(&result.cycles)
            )
            .yellow()
        );
    }

    for node_index in graph.node_indices() {
        println!("{}", graph[node_index].blue().bold());

        // petgraph yields neighbors in reverse insertion order
        let mut deps: Vec<&str> = graph
            .neighbors(node_index)
            .map(|neighbor| graph[neighbor].as_str())
            .collect();
        deps.reverse();

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
