//! Build a local `octopipe.yaml` from a project that already exists on the
//! server.

use crate::client::OctopusApi;
use crate::config::{Octopipe, Process, Project, Step};
use crate::error::{OctopipeError, Result};
use crate::paths;
use crate::remote::{DeploymentAction, PROP_SCRIPT_BODY, PROP_SCRIPT_SYNTAX, SCRIPT_ACTION_TYPE};
use crate::scope::ScopeCatalog;
use crate::types::ScriptSyntax;
use crate::variables::import_variables;
use std::path::Path;

/// Fetch project `name` and write `octopipe.yaml` plus one script file per
/// script action under `root`. Refuses to run when `octopipe.yaml` exists.
pub fn import_project(api: &impl OctopusApi, root: &Path, name: &str) -> Result<Octopipe> {
    Octopipe::ensure_absent(root)?;

    let slug = paths::project_slug(name);
    let project = api
        .project_by_slug(&slug)?
        .ok_or_else(|| OctopipeError::ProjectNotFound(slug.clone()))?;
    let variable_set = api.variable_set(&project.variable_set_id)?;
    let process = api.deployment_process(&project.deployment_process_id)?;
    let lifecycles = api.lifecycles()?;
    let groups = api.project_groups()?;

    let lifecycle = lifecycles
        .iter()
        .find(|l| l.id == project.lifecycle_id)
        .map(|l| l.name.clone())
        .unwrap_or_default();
    let group = groups
        .iter()
        .find(|g| g.id == project.project_group_id)
        .map(|g| g.name.clone())
        .unwrap_or_default();

    let catalog = ScopeCatalog::build(&variable_set.scope_values);
    let variables = import_variables(&variable_set.variables, &catalog);

    let mut steps = Vec::new();
    for action in process.steps.iter().flat_map(|s| s.actions.iter()) {
        if action.action_type != SCRIPT_ACTION_TYPE {
            tracing::warn!(
                action = %action.name,
                action_type = %action.action_type,
                "skipping non-script action"
            );
            continue;
        }
        steps.push(write_script(root, action)?);
    }

    let cfg = Octopipe {
        project: Project {
            name: project.name.clone(),
            description: project.description.clone(),
            group,
            lifecycle,
            tenanted: project.tenanted_deployment_mode.clone(),
        },
        variables,
        process: Process { steps },
    };
    cfg.save_new(root)?;
    tracing::info!(
        slug = %slug,
        steps = cfg.process.steps.len(),
        variables = cfg.variables.len(),
        "project imported"
    );
    Ok(cfg)
}

fn write_script(root: &Path, action: &DeploymentAction) -> Result<Step> {
    let syntax = action
        .properties
        .get(PROP_SCRIPT_SYNTAX)
        .cloned()
        .unwrap_or_default();
    let extension = match ScriptSyntax::parse_for(&action.name, &syntax) {
        Ok(s) => s.extension(),
        Err(_) => "txt",
    };
    let body = action
        .properties
        .get(PROP_SCRIPT_BODY)
        .map(String::as_str)
        .unwrap_or_default();

    let file = format!(
        "{}/{}.{}",
        paths::SCRIPTS_DIR,
        paths::project_slug(&action.name),
        extension
    );
    crate::io::atomic_write(&paths::script_path(root, &file), body.as_bytes())?;

    Ok(Step {
        name: action.name.clone(),
        syntax,
        file,
    })
}
