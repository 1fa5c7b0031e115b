//! Push the local configuration to the server: project metadata, then the
//! deployment process and variable set, each overwritten wholesale.

use crate::client::OctopusApi;
use crate::config::{Octopipe, Project, Step};
use crate::error::{OctopipeError, Result};
use crate::paths;
use crate::remote::{
    DeploymentAction, DeploymentStep, Lifecycle, ProjectGroup, RemoteProject,
    DEFAULT_WORKER_POOL, PROP_RUN_ON_SERVER, PROP_SCRIPT_BODY, PROP_SCRIPT_SOURCE,
    PROP_SCRIPT_SYNTAX, SCRIPT_ACTION_TYPE,
};
use crate::scope::ScopeCatalog;
use crate::types::TenancyMode;
use crate::variables::export_variables;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// What a push did, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PushSummary {
    pub project_id: String,
    pub slug: String,
    pub created: bool,
    pub steps: usize,
    pub variables: usize,
}

// ---------------------------------------------------------------------------
// Name lookups
// ---------------------------------------------------------------------------

/// Names must resolve to exactly one remote ID.
pub fn find_lifecycle<'a>(lifecycles: &'a [Lifecycle], name: &str) -> Result<&'a Lifecycle> {
    let matches: Vec<&Lifecycle> = lifecycles.iter().filter(|l| l.name == name).collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(OctopipeError::LifecycleNotFound(name.to_string())),
        _ => Err(OctopipeError::AmbiguousLifecycle(name.to_string())),
    }
}

pub fn find_project_group<'a>(groups: &'a [ProjectGroup], name: &str) -> Result<&'a ProjectGroup> {
    let matches: Vec<&ProjectGroup> = groups.iter().filter(|g| g.name == name).collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(OctopipeError::ProjectGroupNotFound(name.to_string())),
        _ => Err(OctopipeError::AmbiguousProjectGroup(name.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// Create the project if its slug is unknown, otherwise overwrite its
/// metadata in place. Returns the stored project and whether it was created.
pub fn upsert_project(
    api: &impl OctopusApi,
    local: &Project,
    lifecycle_id: &str,
    project_group_id: &str,
    tenancy: TenancyMode,
) -> Result<(RemoteProject, bool)> {
    let slug = paths::project_slug(&local.name);
    match api.project_by_slug(&slug)? {
        None => {
            let new = RemoteProject {
                name: local.name.clone(),
                description: local.description.clone(),
                lifecycle_id: lifecycle_id.to_string(),
                project_group_id: project_group_id.to_string(),
                tenanted_deployment_mode: tenancy.as_str().to_string(),
                ..Default::default()
            };
            tracing::info!(slug = %slug, "creating project");
            Ok((api.create_project(&new)?, true))
        }
        Some(mut existing) => {
            existing.name = local.name.clone();
            existing.description = local.description.clone();
            existing.lifecycle_id = lifecycle_id.to_string();
            existing.project_group_id = project_group_id.to_string();
            existing.tenanted_deployment_mode = tenancy.as_str().to_string();
            tracing::info!(slug = %slug, id = %existing.id, "updating project");
            Ok((api.update_project(&existing)?, false))
        }
    }
}

// ---------------------------------------------------------------------------
// Deployment process
// ---------------------------------------------------------------------------

/// Build one remote step per local step, reading each script body from disk.
pub fn build_process_steps(root: &Path, steps: &[Step]) -> Result<Vec<DeploymentStep>> {
    steps
        .iter()
        .map(|step| {
            let syntax = step.script_syntax()?;
            let body = crate::io::read_text(&paths::script_path(root, &step.file))?;

            let properties = BTreeMap::from([
                (PROP_SCRIPT_SYNTAX.to_string(), syntax.as_str().to_string()),
                (PROP_SCRIPT_SOURCE.to_string(), "Inline".to_string()),
                (PROP_SCRIPT_BODY.to_string(), body),
                (PROP_RUN_ON_SERVER.to_string(), "True".to_string()),
            ]);

            Ok(DeploymentStep {
                name: step.name.clone(),
                actions: vec![DeploymentAction {
                    name: step.name.clone(),
                    action_type: SCRIPT_ACTION_TYPE.to_string(),
                    worker_pool_id: DEFAULT_WORKER_POOL.to_string(),
                    properties,
                }],
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Push `cfg` to the server.
///
/// Everything that can be checked locally is checked before the first
/// request, and lifecycle/group names are resolved before the first
/// mutation. There is no rollback: a failure after the project upsert leaves
/// the project partially updated.
pub fn push(api: &impl OctopusApi, root: &Path, cfg: &Octopipe) -> Result<PushSummary> {
    let tenancy = cfg.project.tenancy()?;
    for v in &cfg.variables {
        v.variable_type()?;
    }
    let steps = build_process_steps(root, &cfg.process.steps)?;

    let lifecycles = api.lifecycles()?;
    let groups = api.project_groups()?;
    let lifecycle = find_lifecycle(&lifecycles, &cfg.project.lifecycle)?;
    let group = find_project_group(&groups, &cfg.project.group)?;

    let (project, created) = upsert_project(api, &cfg.project, &lifecycle.id, &group.id, tenancy)?;

    let mut variable_set = api.variable_set(&project.variable_set_id)?;
    let catalog = ScopeCatalog::build(&variable_set.scope_values);
    let variables = export_variables(&cfg.variables, &catalog)?;

    let mut process = api.deployment_process(&project.deployment_process_id)?;
    let step_count = steps.len();
    process.steps = steps;
    api.update_deployment_process(&process)?;
    tracing::info!(steps = step_count, "deployment process replaced");

    let variable_count = variables.len();
    variable_set.variables = variables;
    api.update_variable_set(&variable_set)?;
    tracing::info!(variables = variable_count, "variable set replaced");

    Ok(PushSummary {
        slug: paths::project_slug(&project.name),
        project_id: project.id,
        created,
        steps: step_count,
        variables: variable_count,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
