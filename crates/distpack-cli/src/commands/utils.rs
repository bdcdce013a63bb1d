//! Shared utilities for command implementations: path resolution and
//! project root detection.

use crate::error::{CliError, Result};
use crate::ui;
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory. Absolute paths are
/// returned unchanged.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Walks up from `start_dir` to the nearest directory holding a
/// `package.json`.
pub fn find_package_json(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .map(Path::to_path_buf)
}

/// Resolve the project root.
///
/// Priority:
/// 1. Explicit `--cwd`, which must be an existing directory
/// 2. Nearest `package.json` walking up from the current directory
/// 3. The current directory, with a warning
pub fn resolve_project_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir()?;
    resolve_project_root_from(explicit_cwd, &current_dir)
}

pub(crate) fn resolve_project_root_from(
    explicit_cwd: Option<&Path>,
    current_dir: &Path,
) -> Result<PathBuf> {
    if let Some(cwd_path) = explicit_cwd {
        let absolute = resolve_path(cwd_path, current_dir);

        if !absolute.exists() {
            return Err(CliError::InvalidArgument(format!(
                "Specified --cwd directory does not exist: {}",
                absolute.display()
            )));
        }

        if !absolute.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "Specified --cwd is not a directory: {}",
                absolute.display()
            )));
        }

        tracing::debug!(root = %absolute.display(), "project root from --cwd");
        return Ok(absolute);
    }

    if let Some(package_root) = find_package_json(current_dir) {
        tracing::debug!(root = %package_root.display(), "project root from package.json");
        return Ok(package_root);
    }

    ui::warning(&format!(
        "No package.json found. Using current directory: {}",
        current_dir.display()
    ));

    Ok(current_dir.to_path_buf())
}
