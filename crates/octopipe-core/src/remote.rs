//! Resource shapes exchanged with the Octopus REST API.
//!
//! Records that are read, modified and written back keep every field the
//! client does not model in `extra`, so a PUT only changes what was set.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

type Extra = serde_json::Map<String, serde_json::Value>;

/// Sensitive variables come back with `"Value": null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub const SCRIPT_ACTION_TYPE: &str = "Octopus.Script";
pub const DEFAULT_WORKER_POOL: &str = "WorkerPools-1";

pub const PROP_SCRIPT_SYNTAX: &str = "Octopus.Action.Script.Syntax";
pub const PROP_SCRIPT_SOURCE: &str = "Octopus.Action.Script.ScriptSource";
pub const PROP_SCRIPT_BODY: &str = "Octopus.Action.Script.ScriptBody";
pub const PROP_RUN_ON_SERVER: &str = "Octopus.Action.RunOnServer";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectGroup {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteProject {
    #[serde(rename = "Id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "VariableSetId", default, skip_serializing_if = "String::is_empty")]
    pub variable_set_id: String,
    #[serde(rename = "LifecycleId", default)]
    pub lifecycle_id: String,
    #[serde(rename = "ProjectGroupId", default)]
    pub project_group_id: String,
    #[serde(
        rename = "DeploymentProcessId",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub deployment_process_id: String,
    #[serde(default)]
    pub tenanted_deployment_mode: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Scope of a remote variable: dimension name → IDs.
pub type RemoteScope = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteVariable {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub scope: RemoteScope,
    #[serde(rename = "Type", default)]
    pub var_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeValue {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

/// The selectable values per dimension, as returned with a variable set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScopeValues {
    #[serde(default)]
    pub environments: Vec<ScopeValue>,
    #[serde(default)]
    pub machines: Vec<ScopeValue>,
    #[serde(default)]
    pub actions: Vec<ScopeValue>,
    #[serde(default)]
    pub roles: Vec<ScopeValue>,
    #[serde(default)]
    pub channels: Vec<ScopeValue>,
    #[serde(default)]
    pub tenant_tags: Vec<ScopeValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteVariableSet {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(default)]
    pub variables: Vec<RemoteVariable>,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub scope_values: ScopeValues,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentAction {
    pub name: String,
    pub action_type: String,
    #[serde(rename = "WorkerPoolId", default)]
    pub worker_pool_id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentStep {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<DeploymentAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteDeploymentProcess {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "ProjectId", default)]
    pub project_id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub steps: Vec<DeploymentStep>,
    #[serde(flatten)]
    pub extra: Extra,
}
