// src/task/model.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::{TaskName, HIDDEN_PREFIX};

/// A command as declared in the task file.
///
/// A single string is handed to the shell verbatim; a token list is joined
/// with single spaces before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaskCommand {
    Single(String),
    Tokens(Vec<String>),
}

impl TaskCommand {
    /// The command as one shell string.
    pub fn to_shell_string(&self) -> String {
        match self {
            TaskCommand::Single(s) => s.clone(),
            TaskCommand::Tokens(tokens) => tokens.join(" "),
        }
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_string())
    }
}

/// A named argument that can be passed to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskArg {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl TaskArg {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// A reference to another task that must run first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDependency {
    pub task: TaskName,
    /// Positional argument values passed to the dependency.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Named execution environment. Carried to the shell backend as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl TaskDependency {
    pub fn new(task: impl Into<TaskName>) -> Self {
        Self {
            task: task.into(),
            args: Vec::new(),
            environment: None,
        }
    }
}

/// Sparse per-platform replacement values.
///
/// Every `Some` field fully replaces the corresponding field of the base
/// task; `None` leaves the base value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<TaskCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<TaskArg>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<TaskDependency>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_env: Option<bool>,
}

/// A single task definition with all its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: TaskName,
    pub cmd: Option<TaskCommand>,
    pub args: Vec<TaskArg>,
    pub depends_on: Vec<TaskDependency>,
    /// Working directory, relative to the project root unless absolute.
    pub cwd: Option<String>,
    /// Merged over the ambient environment at execution time.
    pub env: BTreeMap<String, String>,
    pub description: Option<String>,
    /// Glob patterns relative to the task's working directory.
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub clean_env: bool,
    pub default_environment: Option<String>,
    pub platforms: Option<BTreeMap<String, TaskOverride>>,
}

impl Task {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the task only groups dependencies and has no command.
    pub fn is_alias(&self) -> bool {
        self.cmd.is_none() && !self.depends_on.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with(HIDDEN_PREFIX)
    }

    /// True when the task declares files to fingerprint.
    pub fn is_cacheable(&self) -> bool {
        !self.inputs.is_empty() || !self.outputs.is_empty()
    }

    /// Names of the direct dependencies, in declared order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.depends_on.iter().map(|d| d.task.as_str())
    }
}
