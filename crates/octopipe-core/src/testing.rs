//! In-memory [`OctopusApi`] used by reconciler and importer tests.

use crate::client::OctopusApi;
use crate::error::{OctopipeError, Result};
use crate::paths::project_slug;
use crate::remote::{
    Lifecycle, ProjectGroup, RemoteDeploymentProcess, RemoteProject, RemoteVariableSet,
    ScopeValues,
};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct FakeState {
    pub projects: Vec<RemoteProject>,
    pub variable_sets: BTreeMap<String, RemoteVariableSet>,
    pub processes: BTreeMap<String, RemoteDeploymentProcess>,
    pub lifecycles: Vec<Lifecycle>,
    pub groups: Vec<ProjectGroup>,
    /// Scope values handed to variable sets of newly created projects.
    pub scope_values: ScopeValues,
    pub calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    pub state: RefCell<FakeState>,
}

impl FakeApi {
    pub fn new(scope_values: ScopeValues) -> Self {
        let api = Self::default();
        {
            let mut s = api.state.borrow_mut();
            s.scope_values = scope_values;
            s.lifecycles = vec![
                Lifecycle {
                    id: "Lifecycles-1".to_string(),
                    name: "Default Lifecycle".to_string(),
                },
                Lifecycle {
                    id: "Lifecycles-2".to_string(),
                    name: "Hotfix".to_string(),
                },
            ];
            s.groups = vec![ProjectGroup {
                id: "ProjectGroups-1".to_string(),
                name: "Backend".to_string(),
            }];
        }
        api
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("POST") || c.starts_with("PUT"))
            .collect()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    /// Add an existing project with empty variable set and process.
    pub fn seed_project(&self, project: RemoteProject) {
        let mut s = self.state.borrow_mut();
        let scope_values = s.scope_values.clone();
        s.variable_sets.insert(
            project.variable_set_id.clone(),
            RemoteVariableSet {
                id: project.variable_set_id.clone(),
                scope_values,
                ..Default::default()
            },
        );
        s.processes.insert(
            project.deployment_process_id.clone(),
            RemoteDeploymentProcess {
                id: project.deployment_process_id.clone(),
                project_id: project.id.clone(),
                ..Default::default()
            },
        );
        s.projects.push(project);
    }

    fn not_found(what: &str, id: &str) -> OctopipeError {
        OctopipeError::Remote {
            method: "GET".to_string(),
            url: format!("/api/{what}/{id}"),
            status: 404,
            body: String::new(),
        }
    }
}

impl OctopusApi for FakeApi {
    fn project_by_slug(&self, slug: &str) -> Result<Option<RemoteProject>> {
        self.record(format!("GET project {slug}"));
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .find(|p| project_slug(&p.name) == slug)
            .cloned())
    }

    fn create_project(&self, project: &RemoteProject) -> Result<RemoteProject> {
        self.record(format!("POST project {}", project.name));
        let n = self.state.borrow().projects.len() + 1;
        let mut created = project.clone();
        created.id = format!("Projects-{n}");
        created.variable_set_id = format!("variableset-Projects-{n}");
        created.deployment_process_id = format!("deploymentprocess-Projects-{n}");
        self.seed_project(created.clone());
        Ok(created)
    }

    fn update_project(&self, project: &RemoteProject) -> Result<RemoteProject> {
        self.record(format!("PUT project {}", project.id));
        let mut s = self.state.borrow_mut();
        let slot = s
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| Self::not_found("projects", &project.id))?;
        *slot = project.clone();
        Ok(project.clone())
    }

    fn variable_set(&self, id: &str) -> Result<RemoteVariableSet> {
        self.record(format!("GET variables {id}"));
        self.state
            .borrow()
            .variable_sets
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found("variables", id))
    }

    fn update_variable_set(&self, set: &RemoteVariableSet) -> Result<RemoteVariableSet> {
        self.record(format!("PUT variables {}", set.id));
        self.state
            .borrow_mut()
            .variable_sets
            .insert(set.id.clone(), set.clone());
        Ok(set.clone())
    }

    fn deployment_process(&self, id: &str) -> Result<RemoteDeploymentProcess> {
        self.record(format!("GET process {id}"));
        self.state
            .borrow()
            .processes
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found("deploymentprocesses", id))
    }

    fn update_deployment_process(
        &self,
        process: &RemoteDeploymentProcess,
    ) -> Result<RemoteDeploymentProcess> {
        self.record(format!("PUT process {}", process.id));
        self.state
            .borrow_mut()
            .processes
            .insert(process.id.clone(), process.clone());
        Ok(process.clone())
    }

    fn lifecycles(&self) -> Result<Vec<Lifecycle>> {
        self.record("GET lifecycles".to_string());
        Ok(self.state.borrow().lifecycles.clone())
    }

    fn project_groups(&self) -> Result<Vec<ProjectGroup>> {
        self.record("GET projectgroups".to_string());
        Ok(self.state.borrow().groups.clone())
    }
}
