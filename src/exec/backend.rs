// src/exec/backend.rs

//! Pluggable shell backend abstraction.
//!
//! The scheduler talks to a `ShellBackend` instead of spawning processes
//! itself. Production code uses [`SubprocessShell`](super::SubprocessShell);
//! tests can provide their own implementation that records invocations and
//! returns canned exit codes.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::TaskName;

/// Everything a backend needs to run one task command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
    pub task: TaskName,
    /// Fully rendered command string.
    pub cmd: String,
    /// Task environment, merged over the inherited one by the backend.
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
    /// Inherit only a minimal allow-list of ambient variables.
    pub clean_env: bool,
    /// Environment prefix to run inside, if any.
    pub prefix: Option<PathBuf>,
    /// Named execution environment tag. Not interpreted by the scheduler.
    pub environment: Option<String>,
}

/// Trait abstracting how task commands are executed.
pub trait ShellBackend: Send {
    /// Run the command and resolve to its exit code.
    ///
    /// `Err` is reserved for failures to run the command at all (e.g. the
    /// shell could not be spawned); a command that runs and fails reports a
    /// non-zero code instead.
    fn run<'a>(
        &'a mut self,
        invocation: &'a ShellInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;
}
