use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File and directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "octopipe.yaml";
pub const SCRIPTS_DIR: &str = "scripts";

/// Infix marking a substitution backup, e.g. `deploy.octopipe.ps1`.
pub const BACKUP_MARKER: &str = ".octopipe";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn scripts_dir(root: &Path) -> PathBuf {
    root.join(SCRIPTS_DIR)
}

/// Resolve a step's script path. Relative paths are taken from the project root.
pub fn script_path(root: &Path, file: &str) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

// ---------------------------------------------------------------------------
// Slug derivation
// ---------------------------------------------------------------------------

static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| Regex::new(r"[^0-9a-z]+").unwrap())
}

/// Derive the URL slug the remote service assigns to a project name.
///
/// Lower-cases, collapses every run of non-alphanumerics into one hyphen and
/// trims hyphens from both ends.
pub fn project_slug(name: &str) -> String {
    let lower = name.to_lowercase();
    non_alnum_re()
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
