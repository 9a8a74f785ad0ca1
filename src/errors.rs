// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum TaskrunError {
    #[error("Task '{name}' not found.{}", available_suffix(.available))]
    TaskNotFound {
        name: TaskName,
        available: Vec<TaskName>,
    },

    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<TaskName> },

    #[error("Task '{task}' failed with exit code {exit_code}")]
    TaskExecution { task: TaskName, exit_code: i32 },

    #[error("Failed to parse '{}': {reason}", .path.display())]
    TaskParse { path: PathBuf, reason: String },

    #[error(
        "No task file found in '{}' or any parent directory. Create a taskrun.toml with a [tasks] table.",
        .search_dir.display()
    )]
    NoTaskFile { search_dir: PathBuf },

    #[error("Missing required argument '{arg}' for task '{task}'")]
    MissingArgument { task: TaskName, arg: String },

    #[error("Template error in task '{task}': {reason}")]
    Template { task: TaskName, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskrunError {
    /// Build a `TaskNotFound` error, sorting the known names for display.
    pub fn task_not_found<'a, I>(name: &str, available: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut available: Vec<TaskName> = available.into_iter().cloned().collect();
        available.sort();
        TaskrunError::TaskNotFound {
            name: name.to_string(),
            available,
        }
    }
}

fn available_suffix(available: &[TaskName]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" Available tasks: {}", available.join(", "))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskrunError>;
