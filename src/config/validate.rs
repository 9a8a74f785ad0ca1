// src/config/validate.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::RawTaskFile;
use crate::errors::{Result, TaskrunError};
use crate::task::TaskRegistry;

/// Convert a raw task file into a registry, checking basic invariants.
///
/// `[target.<platform>.tasks]` entries are attached to the task of the same
/// name as platform overrides. An entry for an undeclared task creates that
/// task from the entry and records the entry as its only override.
///
/// Dependency references are not checked here; graph resolution validates
/// the ones it actually reaches.
pub fn build_registry(raw: RawTaskFile, path: &Path) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    for (name, def) in raw.tasks {
        validate_task_name(&name, path)?;
        registry.insert(name.clone(), def.into_task(&name));
    }

    for (platform, target) in raw.target {
        for (name, def) in target.tasks {
            validate_task_name(&name, path)?;
            let task = registry.entry(name.clone()).or_insert_with(|| {
                debug!(task = %name, platform = %platform, "task declared only for a platform");
                def.clone().into_task(&name)
            });
            task.platforms
                .get_or_insert_with(Default::default)
                .insert(platform.clone(), def.into_override());
        }
    }

    Ok(registry)
}

/// Task names become cache file names, so they must be usable as a single
/// path component.
pub fn validate_task_name(name: &str, path: &Path) -> Result<()> {
    let reason = if name.is_empty() {
        Some("task names must not be empty".to_string())
    } else if name == "." || name == ".." {
        Some(format!("'{name}' is not a valid task name"))
    } else if name.contains(['/', '\\']) {
        Some(format!("task name '{name}' must not contain path separators"))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TaskrunError::TaskParse {
            path: path.to_path_buf(),
            reason,
        }),
        None => Ok(()),
    }
}
