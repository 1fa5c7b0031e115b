use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OctopipeError {
    #[error("octopipe.yaml not found at {0}: run 'octopipe create' first")]
    ConfigNotFound(PathBuf),

    #[error("{0} already exists, will not overwrite")]
    ConfigExists(PathBuf),

    #[error(
        "Octopus API key and URI must be specified (--api-key/--uri or OCTOPUS_API_KEY/OCTOPUS_URI)"
    )]
    MissingCredentials,

    #[error("variable '{0}' is defined more than once")]
    DuplicateVariable(String),

    #[error("{method} {url} failed with status {status}:\n{body}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("project with slug '{0}' not found")]
    ProjectNotFound(String),

    #[error("lifecycle with name '{0}' not found")]
    LifecycleNotFound(String),

    #[error("project group with name '{0}' not found")]
    ProjectGroupNotFound(String),

    #[error("lifecycle name '{0}' matches more than one lifecycle")]
    AmbiguousLifecycle(String),

    #[error("project group name '{0}' matches more than one project group")]
    AmbiguousProjectGroup(String),

    #[error("unknown scope dimension '{0}': valid dimensions are {valid}", valid = crate::types::ScopeDimension::valid_list())]
    UnknownScopeDimension(String),

    #[error("scope value with name '{name}' not found in {dimension}")]
    ScopeValueNotFound { dimension: String, name: String },

    #[error("invalid scope for variable '{variable}'")]
    VariableScope {
        variable: String,
        #[source]
        source: Box<OctopipeError>,
    },

    #[error("variable type '{value}' for variable '{variable}' is not valid. Valid types are {valid}")]
    InvalidVariableType {
        variable: String,
        value: String,
        valid: String,
    },

    #[error("script syntax type '{value}' for process step '{step}' is not valid. Syntax types are case sensitive. Valid types are {valid}")]
    InvalidScriptSyntax {
        step: String,
        value: String,
        valid: String,
    },

    #[error("tenancy mode '{value}' is not valid. Valid modes are {valid}")]
    InvalidTenancy { value: String, valid: String },

    #[error("invalid scope filter '{0}': expected comma-separated dimension=name pairs")]
    InvalidScopeFilter(String),

    #[error("invalid scope pattern '{pattern}'")]
    InvalidScopePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("error reading {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OctopipeError>;
