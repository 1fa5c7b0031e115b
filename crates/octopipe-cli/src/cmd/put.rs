use crate::output::print_json;
use anyhow::Context;
use octopipe_core::{config::Octopipe, reconcile::push};
use std::path::Path;
use std::time::Instant;

pub fn run(
    root: &Path,
    uri: Option<String>,
    api_key: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let client = super::connect(uri, api_key)?;
    let cfg = Octopipe::load(root).context("failed to load octopipe.yaml")?;

    let summary = push(&client, root, &cfg)
        .with_context(|| format!("failed to push project '{}'", cfg.project.name))?;
    let elapsed = started.elapsed();

    if json {
        print_json(&serde_json::json!({
            "summary": summary,
            "elapsed_ms": elapsed.as_millis(),
        }))?;
    } else {
        let verb = if summary.created { "Created" } else { "Updated" };
        println!("{verb} project '{}' ({})", summary.slug, summary.project_id);
        println!("  process steps: {}", summary.steps);
        println!("  variables:     {}", summary.variables);
        println!("Done in {:.2}s", elapsed.as_secs_f64());
    }
    Ok(())
}
