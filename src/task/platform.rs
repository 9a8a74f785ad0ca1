// src/task/platform.rs

//! Per-platform override resolution.
//!
//! Overrides are merged field by field: a present field replaces the base
//! value wholesale (no deep merge of `env` or list fields). `name`,
//! `platforms`, `description` and `default_environment` are never touched.

use std::borrow::Cow;

use tracing::trace;

use crate::task::model::{Task, TaskOverride};
use crate::task::TaskRegistry;

/// Return the effective task for `platform`.
///
/// Without a matching override the task is borrowed unchanged, so callers
/// can detect the no-op case with `matches!(_, Cow::Borrowed(_))`.
pub fn resolve_for_platform<'a>(task: &'a Task, platform: &str) -> Cow<'a, Task> {
    match task.platforms.as_ref().and_then(|p| p.get(platform)) {
        Some(entry) => {
            trace!(task = %task.name, platform, "applying platform override");
            Cow::Owned(entry.apply_to(task))
        }
        None => Cow::Borrowed(task),
    }
}

impl Task {
    /// Method form of [`resolve_for_platform`].
    pub fn resolve_for_platform(&self, platform: &str) -> Cow<'_, Task> {
        resolve_for_platform(self, platform)
    }
}

impl TaskOverride {
    /// Produce a copy of `base` with every present field replaced.
    pub fn apply_to(&self, base: &Task) -> Task {
        let mut task = base.clone();

        if let Some(cmd) = &self.cmd {
            task.cmd = Some(cmd.clone());
        }
        if let Some(args) = &self.args {
            task.args = args.clone();
        }
        if let Some(depends_on) = &self.depends_on {
            task.depends_on = depends_on.clone();
        }
        if let Some(cwd) = &self.cwd {
            task.cwd = Some(cwd.clone());
        }
        if let Some(env) = &self.env {
            task.env = env.clone();
        }
        if let Some(inputs) = &self.inputs {
            task.inputs = inputs.clone();
        }
        if let Some(outputs) = &self.outputs {
            task.outputs = outputs.clone();
        }
        if let Some(clean_env) = self.clean_env {
            task.clean_env = clean_env;
        }

        task
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.cmd.is_none()
            && self.args.is_none()
            && self.depends_on.is_none()
            && self.cwd.is_none()
            && self.env.is_none()
            && self.inputs.is_none()
            && self.outputs.is_none()
            && self.clean_env.is_none()
    }
}

/// Resolve every task of a registry for `platform`.
pub fn resolve_registry_for_platform(registry: &TaskRegistry, platform: &str) -> TaskRegistry {
    registry
        .iter()
        .map(|(name, task)| (name.clone(), resolve_for_platform(task, platform).into_owned()))
        .collect()
}
