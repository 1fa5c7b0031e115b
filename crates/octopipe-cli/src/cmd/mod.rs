pub mod clear;
pub mod create;
pub mod put;
pub mod sub;
pub mod validate;

use anyhow::Context;
use octopipe_core::client::{OctopusClient, ServerConfig};

/// Build the API client from the `--uri` / `--api-key` values.
pub(crate) fn connect(
    uri: Option<String>,
    api_key: Option<String>,
) -> anyhow::Result<OctopusClient> {
    let config = ServerConfig::from_parts(uri, api_key)?;
    tracing::debug!(uri = %config.uri, "connecting");
    OctopusClient::new(config).context("failed to build HTTP client")
}
