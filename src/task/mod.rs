// src/task/mod.rs

//! Task data model and platform override resolution.
//!
//! - [`model`] holds the declarative task types produced by the task file
//!   loader.
//! - [`platform`] merges per-platform overrides into an effective task.

pub mod model;
pub mod platform;

use std::collections::BTreeMap;

use crate::types::TaskName;

pub use model::{Task, TaskArg, TaskCommand, TaskDependency, TaskOverride};
pub use platform::{resolve_for_platform, resolve_registry_for_platform};

/// Mapping from task name to task declaration.
pub type TaskRegistry = BTreeMap<TaskName, Task>;
