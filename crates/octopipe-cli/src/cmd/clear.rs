use crate::output::print_json;
use anyhow::Context;
use octopipe_core::substitute::clear_backups;
use std::path::Path;

pub fn run(directory: &Path, json: bool) -> anyhow::Result<()> {
    let removed = clear_backups(directory)
        .with_context(|| format!("failed to clear backups in {}", directory.display()))?;

    if json {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else if removed.is_empty() {
        println!("No backups to remove.");
    } else {
        for path in &removed {
            println!("  removed: {}", path.display());
        }
    }
    Ok(())
}
