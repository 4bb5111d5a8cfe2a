use anyhow::Result;
use ordo_core::workspace_manager::WorkspaceManager;

pub fn execute() -> Result<()> {
    let schema = WorkspaceManager::task_schema()?;
    println!("{}", schema);
    Ok(())
}
