// src/engine/mod.rs

//! Orchestration engine.
//!
//! The [`Scheduler`] runs a target task and its dependencies one at a time,
//! in resolved order: platform overrides are applied first, then each task
//! is either skipped (alias, dry run, cache hit) or handed to the shell
//! backend. A failing task stops the run.

use std::path::PathBuf;

use crate::types::TaskName;

pub mod scheduler;

pub use scheduler::Scheduler;

/// Per-invocation options for [`Scheduler::run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Positional argument values for the target task.
    pub args: Vec<String>,
    /// Run only the target, without its dependencies.
    pub skip_deps: bool,
    /// Print what would run without executing or touching the cache.
    pub dry_run: bool,
    /// Suppress the `[run]` / `[cached]` / `[dry-run]` status lines.
    pub quiet: bool,
    /// Force a clean environment for every task in the run.
    pub clean_env: bool,
    /// Working directory used for every task instead of its own.
    pub cwd: Option<PathBuf>,
    /// Environment prefix passed through to the shell backend.
    pub prefix: Option<PathBuf>,
}

/// What happened to one task during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The command was executed and exited successfully.
    Ran,
    /// Inputs, outputs, command and environment were unchanged.
    Cached,
    /// The task has no command; it only contributed ordering.
    Alias,
    /// The task has neither a command nor dependencies.
    Empty,
    /// Dry run: the command was printed but not executed.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: TaskName,
    pub status: TaskStatus,
    /// Rendered command, absent for aliases.
    pub cmd: Option<String>,
}
