//! Conversion between local variables (grouped by name, scopes as names) and
//! remote variables (one record per scope combination, scopes as IDs).

use crate::config::{ScopedValue, Variable};
use crate::error::{OctopipeError, Result};
use crate::remote::{RemoteScope, RemoteVariable};
use crate::scope::ScopeCatalog;
use crate::types::{ScopeDimension, VariableType};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Export (local → remote)
// ---------------------------------------------------------------------------

/// Translate every local variable. Any failure fails the whole export, so a
/// push never sends a partial variable list.
pub fn export_variables(
    variables: &[Variable],
    catalog: &ScopeCatalog,
) -> Result<Vec<RemoteVariable>> {
    let mut out = Vec::new();
    for v in variables {
        out.extend(export_variable(v, catalog)?);
    }
    Ok(out)
}

pub fn export_variable(v: &Variable, catalog: &ScopeCatalog) -> Result<Vec<RemoteVariable>> {
    let var_type = v.variable_type()?;
    let record = |value: &str, scope: RemoteScope| RemoteVariable {
        name: v.name.clone(),
        value: value.to_string(),
        description: v.description.clone(),
        is_sensitive: false,
        scope,
        var_type: var_type.as_str().to_string(),
    };

    let mut out = Vec::new();
    if let Some(value) = v.scalar_value() {
        out.push(record(value, RemoteScope::new()));
    }
    for entry in &v.scoped_values {
        let scope = export_scope(entry, catalog).map_err(|e| OctopipeError::VariableScope {
            variable: v.name.clone(),
            source: Box::new(e),
        })?;
        out.push(record(&entry.value, scope));
    }
    Ok(out)
}

fn export_scope(entry: &ScopedValue, catalog: &ScopeCatalog) -> Result<RemoteScope> {
    let mut scope = RemoteScope::new();
    for (key, names) in &entry.scope {
        let dimension: ScopeDimension = key.parse()?;
        let ids = catalog.resolve_names_to_ids(dimension, names)?;
        scope.insert(dimension.as_str().to_string(), ids);
    }
    Ok(scope)
}

// ---------------------------------------------------------------------------
// Import (remote → local)
// ---------------------------------------------------------------------------

/// Group remote records by name, in first-seen order, into local variables.
pub fn import_variables(remote: &[RemoteVariable], catalog: &ScopeCatalog) -> Vec<Variable> {
    let mut groups: Vec<(&str, Vec<&RemoteVariable>)> = Vec::new();
    for rv in remote {
        match groups.iter_mut().find(|(name, _)| *name == rv.name) {
            Some((_, members)) => members.push(rv),
            None => groups.push((rv.name.as_str(), vec![rv])),
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| import_group(name, &members, catalog))
        .collect()
}

fn import_group(name: &str, members: &[&RemoteVariable], catalog: &ScopeCatalog) -> Variable {
    let first = members[0];
    if first.is_sensitive {
        tracing::warn!(variable = %name, "sensitive value is not returned by the server");
    }

    let var_type = match first.var_type.as_str() {
        t if t == VariableType::String.as_str() => String::new(),
        t => t.to_string(),
    };
    if VariableType::parse_for(name, &var_type).is_err() {
        tracing::warn!(
            variable = %name,
            var_type = %var_type,
            "imported variable type cannot be pushed back"
        );
    }
    let mut variable = Variable {
        name: name.to_string(),
        var_type,
        description: first.description.clone(),
        ..Default::default()
    };

    if let [only] = members {
        if only.scope.is_empty() {
            variable.value = Some(only.value.clone());
            return variable;
        }
    }

    for rv in members {
        let entry = ScopedValue {
            value: rv.value.clone(),
            scope: import_scope(&rv.scope, catalog),
        };
        match variable
            .scoped_values
            .iter_mut()
            .find(|existing| existing.scope == entry.scope)
        {
            Some(existing) => existing.value = entry.value,
            None => variable.scoped_values.push(entry),
        }
    }
    variable
}

fn import_scope(scope: &RemoteScope, catalog: &ScopeCatalog) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, ids) in scope {
        let Ok(dimension) = key.parse::<ScopeDimension>() else {
            tracing::debug!(dimension = %key, "skipping unsupported scope dimension");
            continue;
        };
        let names = catalog.resolve_ids_to_names(dimension, ids);
        if !names.is_empty() {
            out.insert(dimension.as_str().to_string(), names);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
