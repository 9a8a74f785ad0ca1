#![cfg(unix)]

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;

use taskrun::engine::{RunOptions, Scheduler, TaskStatus};
use taskrun::errors::TaskrunError;
use taskrun::exec::shell::shell_command;
use taskrun::exec::{ShellBackend, ShellInvocation, SubprocessShell};
use taskrun_test_utils::builders::{settings, task_file_in, RegistryBuilder, TaskBuilder};
use taskrun_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn invocation(task: &str, cmd: &str, cwd: &std::path::Path) -> ShellInvocation {
    ShellInvocation {
        task: task.to_string(),
        cmd: cmd.to_string(),
        env: BTreeMap::new(),
        cwd: cwd.to_path_buf(),
        clean_env: false,
        prefix: None,
        environment: None,
    }
}

#[test]
fn commands_run_through_a_shell_with_dash_c() {
    let (program, args) = shell_command("echo hi && echo there");
    assert!(!program.is_empty());
    assert_eq!(args, vec!["-c", "echo hi && echo there"]);
}

#[tokio::test]
async fn exit_codes_are_reported() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let mut shell = SubprocessShell::new();

    let ok = with_timeout(shell.run(&invocation("ok", "true", dir.path()))).await?;
    let failed = with_timeout(shell.run(&invocation("bad", "exit 7", dir.path()))).await?;

    assert_eq!(ok, 0);
    assert_eq!(failed, 7);
    Ok(())
}

#[tokio::test]
async fn env_and_cwd_reach_the_child() -> TestResult {
    let dir = TempDir::new()?;
    let mut inv = invocation("env", "echo \"$GREETING\" > out.txt", dir.path());
    inv.env.insert("GREETING".into(), "hello".into());
    inv.clean_env = true;

    let code = with_timeout(SubprocessShell::new().run(&inv)).await?;

    assert_eq!(code, 0);
    assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?.trim(), "hello");
    Ok(())
}

#[tokio::test]
async fn real_run_writes_outputs_and_then_hits_cache() -> TestResult {
    init_tracing();
    let project = TempDir::new()?;
    let cache = TempDir::new()?;
    fs::write(project.path().join("in.txt"), "data")?;

    let registry = RegistryBuilder::new()
        .with_task(
            TaskBuilder::new("copy")
                .cmd("cp in.txt out.txt")
                .input("in.txt")
                .output("out.txt")
                .build(),
        )
        .with("fail", "exit 4", &["copy"])
        .build();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        SubprocessShell::new(),
    );
    let options = RunOptions {
        quiet: true,
        ..RunOptions::default()
    };

    let first = with_timeout(scheduler.run("copy", &options)).await?;
    assert_eq!(first[0].status, TaskStatus::Ran);
    assert_eq!(fs::read_to_string(project.path().join("out.txt"))?, "data");

    let second = with_timeout(scheduler.run("copy", &options)).await?;
    assert_eq!(second[0].status, TaskStatus::Cached);

    let err = with_timeout(scheduler.run("fail", &options)).await.unwrap_err();
    assert!(matches!(
        err,
        TaskrunError::TaskExecution { exit_code: 4, .. }
    ));
    Ok(())
}
