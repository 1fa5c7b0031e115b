use crate::output::print_json;
use anyhow::Context;
use octopipe_core::{
    config::{Octopipe, SKELETON_SCRIPTS},
    import::import_project,
    io, paths,
};
use std::path::Path;

pub fn skeleton(root: &Path, json: bool) -> anyhow::Result<()> {
    Octopipe::ensure_absent(root)?;

    let cfg = Octopipe::skeleton();
    cfg.save_new(root).context("failed to write octopipe.yaml")?;

    let mut written = Vec::new();
    for (file, body) in SKELETON_SCRIPTS {
        let path = paths::scripts_dir(root).join(file);
        if io::write_if_missing(&path, body.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?
        {
            written.push(format!("{}/{}", paths::SCRIPTS_DIR, file));
        }
    }

    if json {
        print_json(&serde_json::json!({
            "config": paths::CONFIG_FILE,
            "scripts": written,
        }))?;
    } else {
        println!("  created: {}", paths::CONFIG_FILE);
        for file in &written {
            println!("  created: {file}");
        }
    }
    Ok(())
}

pub fn import(
    root: &Path,
    name: &str,
    uri: Option<String>,
    api_key: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    // Checked again by the importer; failing here avoids needing credentials.
    Octopipe::ensure_absent(root)?;
    let client = super::connect(uri, api_key)?;

    let cfg = import_project(&client, root, name)
        .with_context(|| format!("failed to import project '{name}'"))?;

    if json {
        print_json(&cfg)?;
    } else {
        println!("Imported '{}' into {}", cfg.project.name, paths::CONFIG_FILE);
        println!(
            "  {} variables, {} script steps",
            cfg.variables.len(),
            cfg.process.steps.len()
        );
        for step in &cfg.process.steps {
            println!("  created: {}", step.file);
        }
        for v in cfg.variables.iter().filter(|v| v.variable_type().is_err()) {
            println!(
                "  warning: variable '{}' has type '{}', fix it before 'octopipe put'",
                v.name, v.var_type
            );
        }
    }
    Ok(())
}
