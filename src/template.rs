// src/template.rs

//! Task argument binding and Jinja command templating.
//!
//! Commands and input/output patterns are rendered with `minijinja`, so
//! both `{{ name }}` substitutions and `{% if %}` blocks work. Variables
//! available to a template:
//! - the task's declared `args`, bound from positional values or defaults
//! - a `taskrun` object with `platform`, `manifest_path`, `init_cwd` and the
//!   boolean flags `is_win`, `is_unix`, `is_linux`, `is_osx`
//!
//! Undefined variables are an error rather than an empty string.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;
use tracing::trace;

use crate::errors::{Result, TaskrunError};
use crate::task::{Task, TaskCommand};

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
});

/// Built-in variables exposed as `taskrun.*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Builtins {
    pub platform: String,
    pub manifest_path: String,
    pub init_cwd: String,
    pub is_win: bool,
    pub is_unix: bool,
    pub is_linux: bool,
    pub is_osx: bool,
}

impl Builtins {
    pub fn new(platform: &str, manifest_path: Option<&Path>) -> Self {
        let is_win = platform.starts_with("win-");
        Self {
            platform: platform.to_string(),
            manifest_path: manifest_path
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            init_cwd: std::env::current_dir()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            is_win,
            is_unix: !is_win,
            is_linux: platform.starts_with("linux-"),
            is_osx: platform.starts_with("osx-"),
        }
    }
}

/// Variables visible to templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    builtins: Option<Builtins>,
    args: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Context holding only the `taskrun` built-ins.
    pub fn builtin(platform: &str, manifest_path: Option<&Path>) -> Self {
        Self {
            builtins: Some(Builtins::new(platform, manifest_path)),
            args: BTreeMap::new(),
        }
    }

    /// Copy of this context with task argument values added.
    pub fn with_args(&self, args: &BTreeMap<String, String>) -> Self {
        let mut ctx = self.clone();
        ctx.args
            .extend(args.iter().map(|(k, v)| (k.clone(), v.clone())));
        ctx
    }

    pub fn builtins(&self) -> Option<&Builtins> {
        self.builtins.as_ref()
    }

    fn to_value(&self) -> Value {
        let mut vars: BTreeMap<&str, Value> = self
            .args
            .iter()
            .map(|(k, v)| (k.as_str(), Value::from(v.as_str())))
            .collect();
        if let Some(builtins) = &self.builtins {
            vars.insert("taskrun", Value::from_serialize(builtins));
        }
        Value::from_serialize(&vars)
    }
}

/// Bind positional `values` to the task's declared arguments.
///
/// Values are matched in declaration order; unmatched arguments take their
/// default. Extra values are ignored.
pub fn resolve_task_args(task: &Task, values: &[String]) -> Result<BTreeMap<String, String>> {
    let mut bound = BTreeMap::new();
    for (idx, arg) in task.args.iter().enumerate() {
        let value = values
            .get(idx)
            .cloned()
            .or_else(|| arg.default.clone())
            .ok_or_else(|| TaskrunError::MissingArgument {
                task: task.name.clone(),
                arg: arg.name.clone(),
            })?;
        bound.insert(arg.name.clone(), value);
    }
    Ok(bound)
}

fn has_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

/// Render one template string.
///
/// Strings without any template syntax are returned unchanged.
pub fn render(task_name: &str, template: &str, ctx: &TemplateContext) -> Result<String> {
    if !has_template_syntax(template) {
        return Ok(template.to_string());
    }

    trace!(task = task_name, template, "rendering template");
    TEMPLATES
        .render_str(template, ctx.to_value())
        .map_err(|err| TaskrunError::Template {
            task: task_name.to_string(),
            reason: err.to_string(),
        })
}

/// Render every item of a list, e.g. input or output patterns.
pub fn render_list(task_name: &str, items: &[String], ctx: &TemplateContext) -> Result<Vec<String>> {
    items.iter().map(|item| render(task_name, item, ctx)).collect()
}

/// Render a command into the single shell string that gets executed.
///
/// Token lists are rendered token by token, then joined with spaces.
pub fn render_command(task_name: &str, cmd: &TaskCommand, ctx: &TemplateContext) -> Result<String> {
    match cmd {
        TaskCommand::Single(s) => render(task_name, s, ctx),
        TaskCommand::Tokens(tokens) => Ok(render_list(task_name, tokens, ctx)?.join(" ")),
    }
}
