// src/config/mod.rs

//! Task file loading and runtime settings.
//!
//! Responsibilities:
//! - Define the TOML-backed task file model (`model.rs`).
//! - Discover and load a task file from disk (`loader.rs`).
//! - Turn the raw model into a validated task registry (`validate.rs`).
//! - Resolve process-wide settings once at startup (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

use std::path::PathBuf;

use crate::task::TaskRegistry;

pub use loader::{discover_task_file, load_from_path, load_task_file, parse_str, TASK_FILE_NAME};
pub use model::RawTaskFile;
pub use settings::Settings;
pub use validate::{build_registry, validate_task_name};

/// A loaded task file.
#[derive(Debug, Clone)]
pub struct TaskFile {
    /// Path of the file the tasks were read from.
    pub path: PathBuf,
    /// Directory identifying the project: the file's canonical parent.
    pub project_root: PathBuf,
    pub tasks: TaskRegistry,
}
