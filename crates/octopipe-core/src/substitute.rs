//! `#{name}` token substitution in local script files, for debugging
//! deployment scripts outside the server.

use crate::config::Variable;
use crate::error::{OctopipeError, Result};
use crate::paths::BACKUP_MARKER;
use crate::types::ScopeDimension;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Upper bound on re-scans per file; values may themselves contain tokens.
pub const MAX_PASSES: usize = 5;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"#\{(.*?)\}").unwrap())
}

// ---------------------------------------------------------------------------
// ScopeFilter
// ---------------------------------------------------------------------------

/// Requested scope, e.g. `Environment=Dev,Role=web`. Each requested name is
/// a regex searched for in an entry's selector string, not an exact match.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    entries: Vec<(String, Regex)>,
}

impl ScopeFilter {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (dimension, pattern) = pair
                .split_once('=')
                .ok_or_else(|| OctopipeError::InvalidScopeFilter(raw.to_string()))?;
            let dimension: ScopeDimension = dimension.trim().parse()?;
            let pattern = pattern.trim();
            let re = Regex::new(pattern).map_err(|source| OctopipeError::InvalidScopePattern {
                pattern: pattern.to_string(),
                source,
            })?;
            entries.push((dimension.as_str().to_string(), re));
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::str::FromStr for ScopeFilter {
    type Err = OctopipeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Value resolution
// ---------------------------------------------------------------------------

/// Pick the value of `v` under `filter`: the scalar value, else the last
/// matching scoped entry, else the default entry.
pub fn resolve_variable(v: &Variable, filter: &ScopeFilter) -> Option<String> {
    if let Some(value) = v.scalar_value() {
        return Some(value.to_string());
    }
    let mut selected = v.default_entry().map(|e| e.value.as_str());
    for (dimension, re) in &filter.entries {
        for entry in &v.scoped_values {
            if let Some(selectors) = entry.scope.get(dimension) {
                if re.is_match(selectors) {
                    selected = Some(entry.value.as_str());
                }
            }
        }
    }
    selected.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Resolve every variable once; the map is read-only for the whole run.
pub fn resolve_values(variables: &[Variable], filter: &ScopeFilter) -> HashMap<String, String> {
    variables
        .iter()
        .filter_map(|v| resolve_variable(v, filter).map(|value| (v.name.clone(), value)))
        .collect()
}

// ---------------------------------------------------------------------------
// Text substitution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub text: String,
    /// Literal token text (`#{name}`) of every token left without a value.
    pub unresolved: BTreeSet<String>,
    pub replacements: usize,
    pub passes: usize,
}

fn token_name(token: &str) -> &str {
    token
        .strip_prefix("#{")
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(token)
}

pub fn substitute_text(input: &str, values: &HashMap<String, String>) -> Substitution {
    let mut text = input.to_string();
    let mut unresolved = BTreeSet::new();
    let mut replacements = 0;
    let mut passes = 0;

    while passes < MAX_PASSES {
        let tokens: BTreeSet<String> = token_re()
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();
        if tokens.is_empty() {
            break;
        }
        passes += 1;

        let mut changed = false;
        for token in &tokens {
            match values.get(token_name(token)) {
                Some(value) => {
                    let count = text.matches(token.as_str()).count();
                    if count > 0 {
                        text = text.replace(token.as_str(), value);
                        replacements += count;
                        changed = true;
                    }
                }
                None => {
                    unresolved.insert(token.clone());
                }
            }
        }
        if !changed {
            break;
        }
    }

    // Chains deeper than the pass limit leave tokens behind.
    unresolved.extend(token_re().find_iter(&text).map(|m| m.as_str().to_string()));

    Substitution {
        text,
        unresolved,
        replacements,
        passes,
    }
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

pub fn is_backup(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(BACKUP_MARKER))
        .unwrap_or(false)
}

/// `deploy.ps1` → `deploy.octopipe.ps1`; `Makefile` → `Makefile.octopipe`.
pub fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{}{}.{}",
            stem.to_string_lossy(),
            BACKUP_MARKER,
            ext.to_string_lossy()
        ),
        _ => format!("{name}{BACKUP_MARKER}"),
    };
    path.with_file_name(backup)
}

/// Delete every file in `dir` whose name carries the backup marker.
pub fn clear_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in list_dir(dir)? {
        if path.is_file() && is_backup(&path) {
            std::fs::remove_file(&path).map_err(|source| OctopipeError::WriteFile {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "removed backup");
            removed.push(path);
        }
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Back up, substitute and rewrite each file.
    Write,
    /// Resolve and report only; nothing on disk changes.
    CheckOnly,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub backup: Option<PathBuf>,
    /// False when an earlier run's backup was kept.
    pub backup_created: bool,
    pub replacements: usize,
    /// Names of tokens left without a value.
    pub unresolved: Vec<String>,
    pub written: bool,
    /// Not UTF-8; left untouched.
    pub skipped: bool,
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| OctopipeError::ReadFile {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        paths.push(entry.map_err(read_err)?.path());
    }
    paths.sort();
    Ok(paths)
}

/// Files to process: the explicit `filenames` in `dir`, or every file in
/// `dir`. Backups are never selected.
pub fn select_files(dir: &Path, filenames: Option<&[String]>) -> Result<Vec<PathBuf>> {
    let candidates = match filenames {
        Some(names) => {
            let mut paths = Vec::new();
            for name in names {
                let path = dir.join(name);
                std::fs::metadata(&path).map_err(|source| OctopipeError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
                paths.push(path);
            }
            paths
        }
        None => list_dir(dir)?.into_iter().filter(|p| p.is_file()).collect(),
    };
    Ok(candidates.into_iter().filter(|p| !is_backup(p)).collect())
}

/// Substitute one file. In write mode an existing backup is the template, so
/// repeated runs with different scopes always start from the original tokens
/// and the backup itself is never overwritten. Files that are not UTF-8 are
/// skipped and reported.
pub fn substitute_file(
    path: &Path,
    values: &HashMap<String, String>,
    mode: Mode,
) -> Result<FileReport> {
    let backup = backup_path(path);
    let has_backup = backup.is_file();
    let source = if has_backup { &backup } else { path };

    let mut report = FileReport {
        file: path.to_path_buf(),
        backup: None,
        backup_created: false,
        replacements: 0,
        unresolved: Vec::new(),
        written: false,
        skipped: false,
    };

    let bytes = std::fs::read(source).map_err(|source_err| OctopipeError::ReadFile {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    let original = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            tracing::warn!(file = %source.display(), "skipping file that is not UTF-8");
            report.skipped = true;
            return Ok(report);
        }
    };
    tracing::debug!(file = %source.display(), ?mode, "loaded");

    let result = substitute_text(&original, values);
    report.replacements = result.replacements;
    report.unresolved = result
        .unresolved
        .iter()
        .map(|t| token_name(t).to_string())
        .collect();

    if mode == Mode::Write {
        report.backup_created = crate::io::write_if_missing(&backup, original.as_bytes())?;
        if report.backup_created {
            tracing::debug!(backup = %backup.display(), "backed up");
        } else {
            tracing::debug!(backup = %backup.display(), "kept existing backup");
        }
        crate::io::atomic_write(path, result.text.as_bytes())?;
        report.backup = Some(backup);
        report.written = true;
    }

    Ok(report)
}

/// Process the selected files one after another.
pub fn substitute_dir(
    dir: &Path,
    filenames: Option<&[String]>,
    values: &HashMap<String, String>,
    mode: Mode,
) -> Result<Vec<FileReport>> {
    select_files(dir, filenames)?
        .iter()
        .map(|path| substitute_file(path, values, mode))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
