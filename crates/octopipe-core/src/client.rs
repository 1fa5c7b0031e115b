//! Blocking client for the Octopus REST API.

use crate::error::{OctopipeError, Result};
use crate::remote::{
    Lifecycle, ProjectGroup, RemoteDeploymentProcess, RemoteProject, RemoteVariableSet,
};
use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Where the server lives and how to authenticate. Passed in explicitly by
/// the caller; nothing here reads the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub uri: String,
    pub api_key: String,
}

impl ServerConfig {
    pub fn new(uri: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let uri = uri.into().trim().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        if uri.is_empty() || api_key.is_empty() {
            return Err(OctopipeError::MissingCredentials);
        }
        Ok(Self { uri, api_key })
    }

    /// Build from optional parts, e.g. CLI flags with env fallbacks.
    pub fn from_parts(uri: Option<String>, api_key: Option<String>) -> Result<Self> {
        match (uri, api_key) {
            (Some(uri), Some(key)) => Self::new(uri, key),
            _ => Err(OctopipeError::MissingCredentials),
        }
    }
}

// ---------------------------------------------------------------------------
// OctopusApi
// ---------------------------------------------------------------------------

/// The remote operations a push or import needs.
pub trait OctopusApi {
    /// `None` when the server answers 404.
    fn project_by_slug(&self, slug: &str) -> Result<Option<RemoteProject>>;
    fn create_project(&self, project: &RemoteProject) -> Result<RemoteProject>;
    fn update_project(&self, project: &RemoteProject) -> Result<RemoteProject>;
    fn variable_set(&self, id: &str) -> Result<RemoteVariableSet>;
    fn update_variable_set(&self, set: &RemoteVariableSet) -> Result<RemoteVariableSet>;
    fn deployment_process(&self, id: &str) -> Result<RemoteDeploymentProcess>;
    fn update_deployment_process(
        &self,
        process: &RemoteDeploymentProcess,
    ) -> Result<RemoteDeploymentProcess>;
    fn lifecycles(&self) -> Result<Vec<Lifecycle>>;
    fn project_groups(&self) -> Result<Vec<ProjectGroup>>;
}

// ---------------------------------------------------------------------------
// OctopusClient
// ---------------------------------------------------------------------------

pub struct OctopusClient {
    http: Client,
    config: ServerConfig,
}

impl OctopusClient {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("octopipe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.uri, path)
    }

    fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(String, Response)> {
        let url = self.url(path);
        tracing::debug!(method = %method, url = %url, "octopus request");
        let mut request = self
            .http
            .request(method, &url)
            .header(API_KEY_HEADER, &self.config.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok((url, request.send()?))
    }

    fn expect_success(method: &Method, url: String, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(OctopipeError::Remote {
            method: method.to_string(),
            url,
            status: status.as_u16(),
            body,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let (url, response) = self.execute::<()>(Method::GET, path, None)?;
        let response = Self::expect_success(&Method::GET, url, response)?;
        Ok(response.json()?)
    }

    fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let (url, response) = self.execute::<()>(Method::GET, path, None)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success(&Method::GET, url, response)?;
        Ok(Some(response.json()?))
    }

    fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let (url, response) = self.execute(method.clone(), path, Some(body))?;
        let response = Self::expect_success(&method, url, response)?;
        Ok(response.json()?)
    }
}

impl OctopusApi for OctopusClient {
    fn project_by_slug(&self, slug: &str) -> Result<Option<RemoteProject>> {
        self.get_optional(&format!("/api/projects/{slug}"))
    }

    fn create_project(&self, project: &RemoteProject) -> Result<RemoteProject> {
        self.send(Method::POST, "/api/projects", project)
    }

    fn update_project(&self, project: &RemoteProject) -> Result<RemoteProject> {
        self.send(Method::PUT, &format!("/api/projects/{}", project.id), project)
    }

    fn variable_set(&self, id: &str) -> Result<RemoteVariableSet> {
        self.get(&format!("/api/variables/{id}"))
    }

    fn update_variable_set(&self, set: &RemoteVariableSet) -> Result<RemoteVariableSet> {
        self.send(Method::PUT, &format!("/api/variables/{}", set.id), set)
    }

    fn deployment_process(&self, id: &str) -> Result<RemoteDeploymentProcess> {
        self.get(&format!("/api/deploymentprocesses/{id}"))
    }

    fn update_deployment_process(
        &self,
        process: &RemoteDeploymentProcess,
    ) -> Result<RemoteDeploymentProcess> {
        self.send(
            Method::PUT,
            &format!("/api/deploymentprocesses/{}", process.id),
            process,
        )
    }

    fn lifecycles(&self) -> Result<Vec<Lifecycle>> {
        self.get("/api/lifecycles/all")
    }

    fn project_groups(&self) -> Result<Vec<ProjectGroup>> {
        self.get("/api/projectgroups/all")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
