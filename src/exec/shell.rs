// src/exec/shell.rs

//! Production shell backend.

use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::backend::{ShellBackend, ShellInvocation};
use crate::exec::env::{build_env, prepend_prefix_path};

/// Exit code reported when the user interrupts a running task.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Runs commands through the platform shell, inheriting stdio.
///
/// Unix uses `$SHELL -c <cmd>` (falling back to `/bin/sh`); Windows uses
/// `cmd /d /c <cmd>`. Ctrl-C while a task is running kills the child and
/// reports [`INTERRUPTED_EXIT_CODE`].
#[derive(Debug, Clone, Default)]
pub struct SubprocessShell;

impl SubprocessShell {
    pub fn new() -> Self {
        Self
    }
}

impl ShellBackend for SubprocessShell {
    fn run<'a>(
        &'a mut self,
        invocation: &'a ShellInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(run_invocation(invocation))
    }
}

async fn run_invocation(inv: &ShellInvocation) -> Result<i32> {
    let mut env = build_env(&inv.env, inv.clean_env);
    if let Some(prefix) = &inv.prefix {
        prepend_prefix_path(&mut env, prefix);
    }
    if let Some(environment) = &inv.environment {
        debug!(task = %inv.task, environment = %environment, "task requests a named environment");
    }

    let (program, args) = shell_command(&inv.cmd);
    let mut cmd = Command::new(&program);
    cmd.args(&args)
        .env_clear()
        .envs(&env)
        .current_dir(&inv.cwd)
        .kill_on_drop(true);

    info!(
        task = %inv.task,
        cmd = %inv.cmd,
        cwd = ?inv.cwd,
        clean_env = inv.clean_env,
        "starting task process"
    );

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", inv.task))?;

    tokio::select! {
        status = child.wait() => {
            let status = status
                .with_context(|| format!("waiting for process of task '{}'", inv.task))?;
            let code = exit_code(status);
            info!(task = %inv.task, exit_code = code, success = status.success(), "task process exited");
            Ok(code)
        }

        Ok(()) = tokio::signal::ctrl_c() => {
            warn!(task = %inv.task, "interrupted; killing task process");
            if let Err(e) = child.kill().await {
                warn!(task = %inv.task, error = %e, "failed to kill child process");
            }
            Ok(INTERRUPTED_EXIT_CODE)
        }
    }
}

/// Wrap `cmd` in the platform shell invocation.
pub fn shell_command(cmd: &str) -> (String, Vec<String>) {
    if cfg!(windows) {
        (
            "cmd".to_string(),
            vec!["/d".to_string(), "/c".to_string(), cmd.to_string()],
        )
    } else {
        let shell = std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/bin/sh".to_string());
        (shell, vec!["-c".to_string(), cmd.to_string()])
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
