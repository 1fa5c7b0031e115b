use crate::error::{OctopipeError, Result};
use crate::paths;
use crate::types::{ScopeDimension, ScriptSyntax, TenancyMode, VariableType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: String) -> Self {
        Self {
            level: WarnLevel::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: WarnLevel::Error,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Project group name.
    #[serde(default)]
    pub group: String,
    /// Lifecycle name.
    #[serde(default)]
    pub lifecycle: String,
    /// Tenancy mode; empty means `Untenanted`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenanted: String,
}

impl Project {
    pub fn tenancy(&self) -> Result<TenancyMode> {
        self.tenanted.parse()
    }
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

/// One scope-qualified value: dimension name → comma-separated selector names,
/// plus the literal value. An entry without dimensions is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedValue {
    pub value: String,
    #[serde(flatten)]
    pub scope: BTreeMap<String, String>,
}

impl ScopedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            scope: BTreeMap::new(),
        }
    }

    pub fn with(mut self, dimension: ScopeDimension, names: impl Into<String>) -> Self {
        self.scope.insert(dimension.as_str().to_string(), names.into());
        self
    }

    pub fn is_default(&self) -> bool {
        self.scope.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(
        rename = "scopedValues",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub scoped_values: Vec<ScopedValue>,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub var_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Variable {
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn scoped(name: impl Into<String>, scoped_values: Vec<ScopedValue>) -> Self {
        Self {
            name: name.into(),
            scoped_values,
            ..Default::default()
        }
    }

    /// The scalar value, if one is set. An empty string counts as unset.
    pub fn scalar_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    /// The first entry carrying no scope qualifiers.
    pub fn default_entry(&self) -> Option<&ScopedValue> {
        self.scoped_values.iter().find(|sv| sv.is_default())
    }

    pub fn variable_type(&self) -> Result<VariableType> {
        VariableType::parse_for(&self.name, &self.var_type)
    }
}

/// Fail when two variables share a name.
pub fn ensure_unique_names(variables: &[Variable]) -> Result<()> {
    let mut seen = HashSet::new();
    for v in variables {
        if !seen.insert(v.name.as_str()) {
            return Err(OctopipeError::DuplicateVariable(v.name.clone()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// Script syntax, e.g. `PowerShell`.
    #[serde(rename = "type")]
    pub syntax: String,
    /// Script path, relative to the project root.
    pub file: String,
}

impl Step {
    pub fn script_syntax(&self) -> Result<ScriptSyntax> {
        ScriptSyntax::parse_for(&self.name, &self.syntax)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub steps: Vec<Step>,
}

// ---------------------------------------------------------------------------
// Octopipe (octopipe.yaml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Octopipe {
    #[serde(default)]
    pub project: Project,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub process: Process,
}

impl Octopipe {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OctopipeError::ConfigNotFound(path));
        }
        let data = crate::io::read_text(&path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Octopipe = serde_yaml::from_str(data)?;
        ensure_unique_names(&cfg.variables)?;
        Ok(cfg)
    }

    /// Fail if `octopipe.yaml` already exists under `root`.
    pub fn ensure_absent(root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        if path.exists() {
            return Err(OctopipeError::ConfigExists(path));
        }
        Ok(())
    }

    /// Write a new `octopipe.yaml`, refusing to overwrite an existing one.
    pub fn save_new(&self, root: &Path) -> Result<()> {
        Self::ensure_absent(root)?;
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Offline checks; scope names are only resolvable against the server.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning::error("project.name is empty".to_string()));
        }
        if let Err(e) = self.project.tenancy() {
            warnings.push(ConfigWarning::error(e.to_string()));
        }

        for v in &self.variables {
            if let Err(e) = v.variable_type() {
                warnings.push(ConfigWarning::error(e.to_string()));
            }
            if v.scalar_value().is_none() && v.scoped_values.is_empty() {
                warnings.push(ConfigWarning::warning(format!(
                    "variable '{}' has neither a value nor scoped values",
                    v.name
                )));
            }
            for sv in &v.scoped_values {
                for key in sv.scope.keys() {
                    if let Err(e) = key.parse::<ScopeDimension>() {
                        warnings.push(ConfigWarning::error(format!(
                            "variable '{}': {e}",
                            v.name
                        )));
                    }
                }
            }
        }

        if self.process.steps.is_empty() {
            warnings.push(ConfigWarning::warning(
                "process has no steps; put will clear the remote deployment process".to_string(),
            ));
        }
        for step in &self.process.steps {
            if let Err(e) = step.script_syntax() {
                warnings.push(ConfigWarning::error(e.to_string()));
            }
            let path = paths::script_path(root, &step.file);
            if !path.is_file() {
                warnings.push(ConfigWarning::error(format!(
                    "script '{}' for process step '{}' does not exist",
                    step.file, step.name
                )));
            }
        }

        warnings
    }

    // -----------------------------------------------------------------------
    // Skeleton
    // -----------------------------------------------------------------------

    /// Example configuration written by `octopipe create`.
    pub fn skeleton() -> Self {
        Self {
            project: Project {
                name: "OctopusProject".to_string(),
                description: "My Octopus Project".to_string(),
                group: "Octopus Project Group".to_string(),
                lifecycle: "OctopusProject.Lifecycle".to_string(),
                tenanted: String::new(),
            },
            variables: vec![
                Variable::scalar("AksName", "aks-01"),
                Variable::scoped(
                    "AksResourceGroupName",
                    vec![
                        ScopedValue::new("aks-dev-rg").with(ScopeDimension::Environment, "Dev"),
                        ScopedValue::new("aks-test-rg")
                            .with(ScopeDimension::Environment, "Test"),
                        ScopedValue::new("aks-rg"),
                    ],
                ),
                Variable::scalar("AzureUsername", "user@github.com"),
                Variable::scalar("AzureTenantId", "1234-5678-abcd-efgh"),
                Variable {
                    name: "AzureAccount".to_string(),
                    value: Some("octopusdeploy-account".to_string()),
                    var_type: VariableType::AzureAccount.as_str().to_string(),
                    description: "Account used for deployments".to_string(),
                    ..Default::default()
                },
            ],
            process: Process {
                steps: vec![
                    Step {
                        name: "Init".to_string(),
                        syntax: ScriptSyntax::PowerShell.as_str().to_string(),
                        file: format!("{}/init.ps1", paths::SCRIPTS_DIR),
                    },
                    Step {
                        name: "Deploy VM".to_string(),
                        syntax: ScriptSyntax::PowerShell.as_str().to_string(),
                        file: format!("{}/deploy.ps1", paths::SCRIPTS_DIR),
                    },
                ],
            },
        }
    }
}

/// Example scripts referenced by [`Octopipe::skeleton`], as (file, body).
pub const SKELETON_SCRIPTS: &[(&str, &str)] = &[
    (
        "init.ps1",
        r##"$credential = New-Object PSCredential -ArgumentList @("#{AzureUsername}", ("#{AzurePassword}" | ConvertTo-SecureString -Force -AsPlainText))
Login-AzAccount -ServicePrincipal -Tenant "#{AzureTenantId}" -Credential $credential
"##,
    ),
    (
        "deploy.ps1",
        r##"az aks create -g "#{AksResourceGroupName}" -n "#{AksName}" --node-count 5
$cluster = az aks show -n "#{AksName}" -g "#{AksResourceGroupName}" | ConvertFrom-Json
Write-Host $cluster.Status
"##,
    ),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
project:
  name: Payments API
  description: Payment processing
  group: Backend
  lifecycle: Default Lifecycle
variables:
  - name: DbHost
    value: db.internal
  - name: ConnectionString
    type: String
    scopedValues:
      - Environment: Dev,Test
        value: "Server=dev"
      - Environment: Production
        Role: web
        value: "Server=prod"
      - value: "Server=local"
process:
  steps:
    - name: Migrate
      type: Bash
      file: scripts/migrate.sh
"#;

    #[test]
    fn parses_scoped_values() {
        let cfg = Octopipe::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.project.name, "Payments API");
        assert_eq!(cfg.project.tenancy().unwrap(), TenancyMode::Untenanted);

        let cs = cfg.variable("ConnectionString").unwrap();
        assert_eq!(cs.scoped_values.len(), 3);
        assert_eq!(cs.scoped_values[0].scope["Environment"], "Dev,Test");
        assert_eq!(cs.scoped_values[1].scope.len(), 2);
        assert_eq!(cs.default_entry().unwrap().value, "Server=local");
        assert_eq!(cs.scalar_value(), None);

        assert_eq!(cfg.variable("DbHost").unwrap().scalar_value(), Some("db.internal"));
        assert_eq!(cfg.process.steps[0].script_syntax().unwrap(), ScriptSyntax::Bash);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = r#"
project: { name: p }
variables:
  - { name: A, value: "1" }
  - { name: A, value: "2" }
"#;
        let err = Octopipe::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, OctopipeError::DuplicateVariable(ref n) if n == "A"));
    }

    #[test]
    fn empty_scalar_counts_as_unset() {
        let v = Variable::scalar("x", "");
        assert_eq!(v.scalar_value(), None);
    }

    #[test]
    fn load_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let err = Octopipe::load(dir.path()).unwrap_err();
        assert!(matches!(err, OctopipeError::ConfigNotFound(_)));
    }

    #[test]
    fn save_new_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let cfg = Octopipe::skeleton();
        cfg.save_new(dir.path()).unwrap();
        let err = cfg.save_new(dir.path()).unwrap_err();
        assert!(matches!(err, OctopipeError::ConfigExists(_)));

        let loaded = Octopipe::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn skeleton_round_trips_through_yaml() {
        let cfg = Octopipe::skeleton();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(yaml.contains("scopedValues"));
        assert!(!yaml.contains("tenanted"));
        assert_eq!(Octopipe::from_yaml(&yaml).unwrap(), cfg);
    }

    #[test]
    fn validate_reports_errors_and_warnings() {
        let dir = TempDir::new().unwrap();
        let yaml = r#"
project: { name: p, tenanted: Sometimes }
variables:
  - { name: A, type: Secret, value: "1" }
  - { name: B }
  - name: C
    scopedValues:
      - { Tenant: x, value: "1" }
process:
  steps:
    - { name: Run, type: powershell, file: scripts/run.ps1 }
"#;
        let cfg = Octopipe::from_yaml(yaml).unwrap();
        let warnings = cfg.validate(dir.path());
        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message.as_str())
            .collect();
        assert!(errors.iter().any(|m| m.contains("tenancy mode 'Sometimes'")));
        assert!(errors.iter().any(|m| m.contains("variable type 'Secret'")));
        assert!(errors.iter().any(|m| m.contains("unknown scope dimension 'Tenant'")));
        assert!(errors.iter().any(|m| m.contains("script syntax type 'powershell'")));
        assert!(errors.iter().any(|m| m.contains("does not exist")));
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("'B'")));
    }

    #[test]
    fn validate_clean_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(dir.path().join("scripts/migrate.sh"), "echo hi").unwrap();
        let cfg = Octopipe::from_yaml(SAMPLE).unwrap();
        assert!(cfg.validate(dir.path()).is_empty());
    }
}
