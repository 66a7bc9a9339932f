//! Executable discovery: find exactly one `manageStudents` on disk.
//!
//! Traversal is bounded in depth and skips a denylist of directories that
//! never hold a build product. Zero candidates and several candidates are
//! both start-up failures; the oracle never guesses which build to test.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{OracleError, Result};

/// File name of the program under test.
pub const EXECUTABLE_NAME: &str = "manageStudents";

/// Configuration for the executable scan.
#[derive(Debug, Clone)]
pub struct LocateConfig {
    /// Directory the walk starts from.
    pub search_root: PathBuf,
    /// Maximum traversal depth (0 = root only).
    pub max_depth: usize,
    /// Directory names skipped entirely.
    pub denylist: Vec<String>,
    /// File name to look for.
    pub file_name: String,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            search_root: PathBuf::from(".."),
            max_depth: 8,
            denylist: vec![
                ".git".to_owned(),
                "node_modules".to_owned(),
                ".venv".to_owned(),
                "venv".to_owned(),
                "__pycache__".to_owned(),
            ],
            file_name: EXECUTABLE_NAME.to_owned(),
        }
    }
}

/// Walks the search root and returns every matching file, sorted.
#[must_use]
pub fn find_candidates(config: &LocateConfig) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if config.search_root.is_dir() {
        walk_dir(&config.search_root, 0, config, &mut out);
    }
    out.sort();
    out
}

fn walk_dir(dir: &Path, depth: usize, config: &LocateConfig, out: &mut Vec<PathBuf>) {
    if depth > config.max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        // symlink_metadata: never follow links, so cycles cannot recurse.
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };

        if meta.is_dir() {
            let name = entry.file_name();
            if config.denylist.iter().any(|d| *d == name.to_string_lossy()) {
                continue;
            }
            walk_dir(&path, depth + 1, config, out);
        } else if meta.is_file() && entry.file_name().to_string_lossy() == config.file_name {
            let resolved = fs::canonicalize(&path).unwrap_or(path);
            debug!(candidate = %resolved.display(), "executable candidate");
            out.push(resolved);
        }
    }
}

/// Resolves the single executable under test.
///
/// # Errors
///
/// Returns [`OracleError::Environment`] on Windows hosts, when no candidate
/// exists, or when more than one does.
pub fn locate_executable(config: &LocateConfig) -> Result<PathBuf> {
    ensure_supported_host()?;
    let mut candidates = find_candidates(config);
    match candidates.len() {
        0 => Err(OracleError::Environment(format!(
            "no '{}' executable under {}; build the program and run the oracle from within its \
             project directory or one level inside it",
            config.file_name,
            config.search_root.display()
        ))),
        1 => {
            let path = candidates.remove(0);
            info!(executable = %path.display(), "using executable");
            Ok(path)
        }
        n => Err(OracleError::Environment(format!(
            "{n} '{}' executables found, delete all but one: {}",
            config.file_name,
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Checks an explicitly configured executable path.
///
/// # Errors
///
/// Returns [`OracleError::Environment`] on Windows hosts or when `path` is
/// not an existing file.
pub fn verify_executable(path: &Path) -> Result<PathBuf> {
    ensure_supported_host()?;
    if !path.is_file() {
        return Err(OracleError::Environment(format!(
            "configured executable {} is not a file",
            path.display()
        )));
    }
    let resolved = fs::canonicalize(path)?;
    info!(executable = %resolved.display(), "using configured executable");
    Ok(resolved)
}

fn ensure_supported_host() -> Result<()> {
    if cfg!(windows) {
        return Err(OracleError::Environment(
            "the oracle cannot drive the program on Windows".to_owned(),
        ));
    }
    Ok(())
}
