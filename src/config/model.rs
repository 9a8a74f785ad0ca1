// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::task::{Task, TaskArg, TaskCommand, TaskDependency, TaskOverride};

/// Top-level task file as read from TOML.
///
/// ```toml
/// [tasks]
/// build = "make"
/// check = ["lint", "test"]
/// test = { cmd = "pytest", depends-on = ["build"] }
///
/// [target.win-64.tasks]
/// build = "nmake"
/// ```
///
/// Both sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTaskFile {
    #[serde(default)]
    pub tasks: BTreeMap<String, RawTaskDef>,

    /// Per-platform sections, keyed by platform identifier.
    #[serde(default)]
    pub target: BTreeMap<String, RawTarget>,
}

/// `[target.<platform>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTarget {
    #[serde(default)]
    pub tasks: BTreeMap<String, RawTaskDef>,
}

/// One task entry: a command string, an alias list, or a full table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTaskDef {
    Command(String),
    Alias(Vec<String>),
    Table(RawTaskTable),
}

/// `name = { ... }` form of a task entry.
///
/// Every field is optional so the same shape serves both declarations and
/// sparse platform overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawTaskTable {
    #[serde(default)]
    pub cmd: Option<RawCommand>,
    #[serde(default)]
    pub args: Option<Vec<RawArg>>,
    #[serde(default, alias = "depends_on")]
    pub depends_on: Option<OneOrMany<RawDependency>>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: Option<Vec<String>>,
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
    #[serde(default, alias = "clean_env")]
    pub clean_env: Option<bool>,
    #[serde(default, alias = "default_environment")]
    pub default_environment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCommand {
    Single(String),
    Tokens(Vec<String>),
}

/// `args = ["path", { arg = "mode", default = "debug" }]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArg {
    Name(String),
    Table {
        arg: String,
        #[serde(default)]
        default: Option<String>,
    },
}

/// `depends-on = ["a", { task = "b", args = ["1"], environment = "py311" }]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDependency {
    Name(String),
    Table {
        task: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        environment: Option<String>,
    },
}

/// A value that may be written either bare or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl From<RawCommand> for TaskCommand {
    fn from(raw: RawCommand) -> Self {
        match raw {
            RawCommand::Single(s) => TaskCommand::Single(s),
            RawCommand::Tokens(tokens) => TaskCommand::Tokens(tokens),
        }
    }
}

impl From<RawArg> for TaskArg {
    fn from(raw: RawArg) -> Self {
        match raw {
            RawArg::Name(name) => TaskArg::required(name),
            RawArg::Table { arg, default } => TaskArg { name: arg, default },
        }
    }
}

impl From<RawDependency> for TaskDependency {
    fn from(raw: RawDependency) -> Self {
        match raw {
            RawDependency::Name(task) => TaskDependency::new(task),
            RawDependency::Table {
                task,
                args,
                environment,
            } => TaskDependency {
                task,
                args,
                environment,
            },
        }
    }
}

fn convert_deps(raw: OneOrMany<RawDependency>) -> Vec<TaskDependency> {
    raw.into_vec().into_iter().map(TaskDependency::from).collect()
}

fn alias_deps(names: Vec<String>) -> Vec<TaskDependency> {
    names.into_iter().map(TaskDependency::new).collect()
}

impl RawTaskDef {
    /// Convert a `[tasks]` entry into a task declaration.
    pub fn into_task(self, name: &str) -> Task {
        let mut task = Task::new(name);
        match self {
            RawTaskDef::Command(cmd) => task.cmd = Some(TaskCommand::Single(cmd)),
            RawTaskDef::Alias(deps) => task.depends_on = alias_deps(deps),
            RawTaskDef::Table(table) => {
                task.cmd = table.cmd.map(TaskCommand::from);
                task.args = table
                    .args
                    .map(|args| args.into_iter().map(TaskArg::from).collect())
                    .unwrap_or_default();
                task.depends_on = table.depends_on.map(convert_deps).unwrap_or_default();
                task.cwd = table.cwd;
                task.env = table.env.unwrap_or_default();
                task.description = table.description;
                task.inputs = table.inputs.unwrap_or_default();
                task.outputs = table.outputs.unwrap_or_default();
                task.clean_env = table.clean_env.unwrap_or(false);
                task.default_environment = table.default_environment;
            }
        }
        task
    }

    /// Convert a `[target.<platform>.tasks]` entry into a sparse override.
    ///
    /// `description` and `default-environment` are not overridable and are
    /// ignored here.
    pub fn into_override(self) -> TaskOverride {
        match self {
            RawTaskDef::Command(cmd) => TaskOverride {
                cmd: Some(TaskCommand::Single(cmd)),
                ..TaskOverride::default()
            },
            RawTaskDef::Alias(deps) => TaskOverride {
                depends_on: Some(alias_deps(deps)),
                ..TaskOverride::default()
            },
            RawTaskDef::Table(table) => TaskOverride {
                cmd: table.cmd.map(TaskCommand::from),
                args: table
                    .args
                    .map(|args| args.into_iter().map(TaskArg::from).collect()),
                depends_on: table.depends_on.map(convert_deps),
                cwd: table.cwd,
                env: table.env,
                inputs: table.inputs,
                outputs: table.outputs,
                clean_env: table.clean_env,
            },
        }
    }
}
