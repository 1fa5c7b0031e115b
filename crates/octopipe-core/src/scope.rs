use crate::error::{OctopipeError, Result};
use crate::remote::{ScopeValue, ScopeValues};
use crate::types::ScopeDimension;
use std::collections::BTreeMap;

/// Name ↔ ID index of scope values, built once per run from the remote
/// variable set and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ScopeCatalog {
    dimensions: BTreeMap<ScopeDimension, Vec<ScopeValue>>,
}

impl ScopeCatalog {
    pub fn build(raw: &ScopeValues) -> Self {
        let dimensions = ScopeDimension::all()
            .iter()
            .map(|&d| {
                let values = match d {
                    ScopeDimension::Environment => &raw.environments,
                    ScopeDimension::Machine => &raw.machines,
                    ScopeDimension::Role => &raw.roles,
                    ScopeDimension::TenantTag => &raw.tenant_tags,
                    ScopeDimension::Channel => &raw.channels,
                    ScopeDimension::Action => &raw.actions,
                };
                (d, values.clone())
            })
            .collect();
        Self { dimensions }
    }

    pub fn values(&self, dimension: ScopeDimension) -> &[ScopeValue] {
        self.dimensions
            .get(&dimension)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn key(dimension: ScopeDimension, value: &ScopeValue) -> &str {
        if dimension.matches_by_id() {
            &value.id
        } else {
            &value.name
        }
    }

    /// Resolve comma-separated selector names to IDs. All-or-nothing: the
    /// first unknown name fails the whole call.
    pub fn resolve_names_to_ids(
        &self,
        dimension: ScopeDimension,
        names: &str,
    ) -> Result<Vec<String>> {
        let values = self.values(dimension);
        names
            .split(',')
            .map(|name| {
                values
                    .iter()
                    .find(|v| Self::key(dimension, v) == name)
                    .map(|v| v.id.clone())
                    .ok_or_else(|| OctopipeError::ScopeValueNotFound {
                        dimension: dimension.to_string(),
                        name: name.to_string(),
                    })
            })
            .collect()
    }

    /// Inverse of [`resolve_names_to_ids`](Self::resolve_names_to_ids).
    /// Unknown IDs are dropped.
    pub fn resolve_ids_to_names(&self, dimension: ScopeDimension, ids: &[String]) -> String {
        let values = self.values(dimension);
        ids.iter()
            .filter_map(|id| values.iter().find(|v| &v.id == id))
            .map(|v| Self::key(dimension, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}
