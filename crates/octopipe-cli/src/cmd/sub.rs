use crate::output::{print_json, print_table};
use anyhow::Context;
use octopipe_core::{
    config::Octopipe,
    substitute::{resolve_values, substitute_dir, Mode, ScopeFilter},
};
use std::path::Path;

pub fn run(
    root: &Path,
    directory: &Path,
    scope: &str,
    filenames: Option<&[String]>,
    check_only: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = Octopipe::load(root).context("failed to load octopipe.yaml")?;
    let filter = ScopeFilter::parse(scope)?;
    let values = resolve_values(&cfg.variables, &filter);
    tracing::debug!(resolved = values.len(), "variables resolved for scope");

    let mode = if check_only { Mode::CheckOnly } else { Mode::Write };
    let reports = substitute_dir(directory, filenames, &values, mode)
        .with_context(|| format!("failed to substitute in {}", directory.display()))?;

    if json {
        return print_json(&reports);
    }

    if reports.is_empty() {
        println!("No files to process in {}.", directory.display());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            let backup = match (&r.backup, r.backup_created) {
                (Some(b), true) => b.display().to_string(),
                (Some(b), false) => format!("{} (kept)", b.display()),
                (None, _) => String::new(),
            };
            let unresolved = if r.skipped {
                "skipped: not UTF-8".to_string()
            } else {
                r.unresolved.join(", ")
            };
            vec![
                r.file.display().to_string(),
                r.replacements.to_string(),
                backup,
                unresolved,
            ]
        })
        .collect();
    print_table(&["FILE", "REPLACED", "BACKUP", "UNRESOLVED"], &rows);

    let unresolved: usize = reports.iter().map(|r| r.unresolved.len()).sum();
    if unresolved > 0 {
        println!("\n{unresolved} unresolved token(s); files still contain #{{...}} placeholders.");
    }
    if check_only {
        println!("Check only: no files were changed.");
    }
    Ok(())
}
