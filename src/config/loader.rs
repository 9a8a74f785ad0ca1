// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawTaskFile;
use crate::config::validate::build_registry;
use crate::config::TaskFile;
use crate::errors::{Result, TaskrunError};

/// File name looked up by [`discover_task_file`].
pub const TASK_FILE_NAME: &str = "taskrun.toml";

/// Walk upward from `start_dir` looking for a task file.
///
/// The first directory containing [`TASK_FILE_NAME`] wins.
pub fn discover_task_file(start_dir: &Path) -> Result<PathBuf> {
    let start = fs::canonicalize(start_dir)?;

    for dir in start.ancestors() {
        let candidate = dir.join(TASK_FILE_NAME);
        if candidate.is_file() {
            debug!(path = ?candidate, "found task file");
            return Ok(candidate);
        }
    }

    Err(TaskrunError::NoTaskFile { search_dir: start })
}

/// Parse task file contents without any validation.
pub fn parse_str(contents: &str) -> Result<RawTaskFile> {
    Ok(toml::from_str(contents)?)
}

/// Load a task file from `path` and return the raw model.
///
/// This only performs TOML deserialization; use [`load_task_file`] to get a
/// validated registry.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawTaskFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    parse_str(&contents).map_err(|err| match err {
        TaskrunError::Toml(e) => TaskrunError::TaskParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        other => other,
    })
}

/// Load a task file and build its validated task registry.
///
/// The project root is the canonical directory containing the file.
pub fn load_task_file(path: impl AsRef<Path>) -> Result<TaskFile> {
    let path = fs::canonicalize(path.as_ref())?;
    let raw = load_from_path(&path)?;
    let tasks = build_registry(raw, &path)?;

    let project_root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    debug!(path = ?path, tasks = tasks.len(), "loaded task file");
    Ok(TaskFile {
        path,
        project_root,
        tasks,
    })
}
