use std::error::Error;
use std::fs;

use taskrun::engine::{RunOptions, Scheduler, TaskStatus};
use taskrun::errors::TaskrunError;
use taskrun::task::{TaskCommand, TaskDependency, TaskOverride};
use taskrun_test_utils::builders::{settings, task_file_in, RegistryBuilder, TaskBuilder};
use taskrun_test_utils::fake_shell::FakeShell;
use taskrun_test_utils::{init_tracing, with_timeout};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn quiet() -> RunOptions {
    RunOptions {
        quiet: true,
        ..RunOptions::default()
    }
}

fn statuses(reports: &[taskrun::engine::TaskReport]) -> Vec<(&str, TaskStatus)> {
    reports
        .iter()
        .map(|r| (r.name.as_str(), r.status))
        .collect()
}

#[tokio::test]
async fn runs_dependencies_in_order() -> TestResult {
    init_tracing();
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("a", "echo a", &[])
        .with("b", "echo b", &["a"])
        .with("c", "echo c", &["b"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let reports = with_timeout(scheduler.run("c", &quiet())).await?;

    assert_eq!(shell.executed(), vec!["a", "b", "c"]);
    assert_eq!(
        statuses(&reports),
        vec![
            ("a", TaskStatus::Ran),
            ("b", TaskStatus::Ran),
            ("c", TaskStatus::Ran)
        ]
    );
    Ok(())
}

#[tokio::test]
async fn aliases_are_not_executed() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("lint", "ruff .", &[])
        .with("test", "pytest", &[])
        .with_alias("check", &["lint", "test"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let reports = scheduler.run("check", &quiet()).await?;

    assert_eq!(shell.executed(), vec!["lint", "test"]);
    assert_eq!(reports.last().map(|r| r.status), Some(TaskStatus::Alias));
    Ok(())
}

#[tokio::test]
async fn dry_run_executes_nothing_and_writes_no_cache() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("build").cmd("make").output("out").build())
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let options = RunOptions {
        dry_run: true,
        ..quiet()
    };
    let reports = scheduler.run("build", &options).await?;

    assert!(shell.executed().is_empty());
    assert_eq!(reports[0].status, TaskStatus::DryRun);
    assert_eq!(reports[0].cmd.as_deref(), Some("make"));
    assert_eq!(fs::read_dir(cache.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn second_run_with_unchanged_inputs_is_cached() -> TestResult {
    init_tracing();
    let project = TempDir::new()?;
    let cache = TempDir::new()?;
    fs::write(project.path().join("input.txt"), "v1")?;

    let registry = RegistryBuilder::new()
        .with_task(
            TaskBuilder::new("build")
                .cmd("cp input.txt output.txt")
                .input("input.txt")
                .output("output.txt")
                .build(),
        )
        .build();

    // The fake shell "runs" the copy so the output exists afterwards.
    let shell = FakeShell::new().on_run(|inv| {
        let _ = fs::copy(inv.cwd.join("input.txt"), inv.cwd.join("output.txt"));
    });
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let first = scheduler.run("build", &quiet()).await?;
    let second = scheduler.run("build", &quiet()).await?;

    assert_eq!(first[0].status, TaskStatus::Ran);
    assert_eq!(second[0].status, TaskStatus::Cached);
    assert_eq!(shell.executed(), vec!["build"]);

    fs::write(project.path().join("input.txt"), "version two")?;
    let third = scheduler.run("build", &quiet()).await?;
    assert_eq!(third[0].status, TaskStatus::Ran);
    assert_eq!(shell.executed(), vec!["build", "build"]);
    Ok(())
}

#[tokio::test]
async fn tasks_without_inputs_or_outputs_always_run() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new().with("hello", "echo hi", &[]).build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    scheduler.run("hello", &quiet()).await?;
    scheduler.run("hello", &quiet()).await?;

    assert_eq!(shell.executed(), vec!["hello", "hello"]);
    assert_eq!(fs::read_dir(cache.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn failure_halts_the_run_and_is_not_cached() -> TestResult {
    init_tracing();
    let project = TempDir::new()?;
    let cache = TempDir::new()?;
    fs::write(project.path().join("src.txt"), "x")?;

    let registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("a").cmd("false").input("src.txt").build())
        .with("b", "echo b", &["a"])
        .build();
    let shell = FakeShell::new().failing("a", 3);
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let err = scheduler.run("b", &quiet()).await.unwrap_err();
    match err {
        TaskrunError::TaskExecution { task, exit_code } => {
            assert_eq!(task, "a");
            assert_eq!(exit_code, 3);
        }
        other => panic!("expected TaskExecution, got {other:?}"),
    }
    assert_eq!(shell.executed(), vec!["a"]);
    assert!(scheduler.cache().load_entry(project.path(), "a").is_none());
    Ok(())
}

#[tokio::test]
async fn cycle_fails_before_anything_runs() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("ok", "echo ok", &[])
        .with("a", "echo a", &["ok", "b"])
        .with("b", "echo b", &["a"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let result = scheduler.run("a", &quiet()).await;
    assert!(matches!(result, Err(TaskrunError::CyclicDependency { .. })));
    assert!(shell.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn skip_deps_runs_only_target() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("a", "echo a", &[])
        .with("b", "echo b", &["a"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let options = RunOptions {
        skip_deps: true,
        ..quiet()
    };
    scheduler.run("b", &options).await?;
    assert_eq!(shell.executed(), vec!["b"]);
    Ok(())
}

#[tokio::test]
async fn arguments_flow_from_cli_and_dependency_edges() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(
            TaskBuilder::new("compile")
                .cmd("cc -o {{ out }} --mode {{ mode }}")
                .arg("out")
                .arg_with_default("mode", "debug")
                .build(),
        )
        .with_task(
            TaskBuilder::new("package")
                .cmd("tar czf {{ name }}.tgz")
                .arg("name")
                .depends_on_with_args("compile", &["app"])
                .build(),
        )
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let options = RunOptions {
        args: vec!["bundle".to_string()],
        ..quiet()
    };
    scheduler.run("package", &options).await?;

    assert_eq!(
        shell.commands(),
        vec!["cc -o app --mode debug", "tar czf bundle.tgz"]
    );
    Ok(())
}

#[tokio::test]
async fn missing_argument_stops_the_run() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("greet").cmd("echo {{ who }}").arg("who").build())
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let result = scheduler.run("greet", &quiet()).await;
    assert!(matches!(result, Err(TaskrunError::MissingArgument { .. })));
    assert!(shell.executed().is_empty());
    Ok(())
}

#[tokio::test]
async fn invocation_carries_env_cwd_and_flags() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let mut registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("setup").cmd("true").build())
        .with_task(
            TaskBuilder::new("build")
                .cmd("make")
                .cwd("sub")
                .env("CC", "clang")
                .clean_env(true)
                .build(),
        )
        .with_task(TaskBuilder::new("deploy").cmd("ship").build())
        .build();
    if let Some(deploy) = registry.get_mut("deploy") {
        deploy.depends_on.push(TaskDependency {
            task: "setup".into(),
            args: vec![],
            environment: Some("staging".into()),
        });
        deploy.default_environment = Some("prod".into());
    }

    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    scheduler.run("build", &quiet()).await?;
    scheduler.run("deploy", &quiet()).await?;

    let recorded = shell.recorded();
    let invocations = recorded.lock().unwrap();

    let build = &invocations[0];
    assert_eq!(build.cwd, project.path().join("sub"));
    assert_eq!(build.env.get("CC").map(String::as_str), Some("clang"));
    assert!(build.clean_env);
    assert_eq!(build.prefix, None);

    let setup = &invocations[1];
    assert_eq!(setup.task, "setup");
    assert_eq!(setup.environment.as_deref(), Some("staging"));
    assert_eq!(setup.cwd, project.path());

    let deploy = &invocations[2];
    assert_eq!(deploy.environment.as_deref(), Some("prod"));
    Ok(())
}

#[tokio::test]
async fn cwd_and_prefix_options_apply_to_every_task() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;
    let elsewhere = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("a").cmd("pwd").cwd("sub").build())
        .with("b", "pwd", &["a"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let options = RunOptions {
        cwd: Some(elsewhere.path().to_path_buf()),
        prefix: Some(elsewhere.path().join("env")),
        clean_env: true,
        ..quiet()
    };
    scheduler.run("b", &options).await?;

    let recorded = shell.recorded();
    for inv in recorded.lock().unwrap().iter() {
        assert_eq!(inv.cwd, elsewhere.path());
        assert_eq!(inv.prefix.as_deref(), Some(elsewhere.path().join("env").as_path()));
        assert!(inv.clean_env);
    }
    Ok(())
}

#[tokio::test]
async fn platform_overrides_select_the_command() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(
            TaskBuilder::new("build")
                .cmd("make")
                .platform(
                    "win-64",
                    TaskOverride {
                        cmd: Some(TaskCommand::Single("nmake".into())),
                        ..TaskOverride::default()
                    },
                )
                .build(),
        )
        .build();

    let win_shell = FakeShell::new();
    let mut win = Scheduler::new(
        task_file_in(project.path(), registry.clone()),
        &settings(cache.path(), "win-64"),
        win_shell.clone(),
    );
    win.run("build", &quiet()).await?;

    let linux_shell = FakeShell::new();
    let mut linux = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        linux_shell.clone(),
    );
    linux.run("build", &quiet()).await?;

    assert_eq!(win_shell.commands(), vec!["nmake"]);
    assert_eq!(linux_shell.commands(), vec!["make"]);
    Ok(())
}

#[tokio::test]
async fn builtin_variables_render_in_commands() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("show", "echo {{ taskrun.platform }} {{ taskrun.is_linux }}", &[])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    scheduler.run("show", &quiet()).await?;
    assert_eq!(shell.commands(), vec!["echo linux-64 true"]);
    Ok(())
}

#[tokio::test]
async fn plan_matches_run_order() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with("a", "echo a", &[])
        .with("b", "echo b", &["a"])
        .build();
    let scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        FakeShell::new(),
    );

    assert_eq!(scheduler.plan("b", false)?, vec!["a", "b"]);
    assert_eq!(scheduler.plan("b", true)?, vec!["b"]);
    Ok(())
}

#[tokio::test]
async fn input_and_output_patterns_are_rendered_with_task_args() -> TestResult {
    init_tracing();
    let project = TempDir::new()?;
    let cache = TempDir::new()?;
    fs::create_dir_all(project.path().join("src"))?;
    fs::write(project.path().join("src/main.py"), "print('hi')")?;

    let registry = RegistryBuilder::new()
        .with_task(
            TaskBuilder::new("compile")
                .cmd("python -m py_compile src/{{ name }}.py")
                .arg("name")
                .input("src/{{ name }}.py")
                .output("build/{{ name }}.pyc")
                .build(),
        )
        .build();
    let shell = FakeShell::new().on_run(|inv| {
        let _ = fs::create_dir_all(inv.cwd.join("build"));
        let _ = fs::write(inv.cwd.join("build/main.pyc"), "bytecode");
    });
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );
    let options = RunOptions {
        args: vec!["main".to_string()],
        ..quiet()
    };

    scheduler.run("compile", &options).await?;

    let entry = scheduler
        .cache()
        .load_entry(project.path(), "compile")
        .ok_or("no cache entry written")?;
    assert_eq!(entry.inputs.len(), 1);
    assert!(entry.inputs.keys().all(|k| k.ends_with("main.py")));
    assert_eq!(entry.outputs.len(), 1);
    assert!(entry.outputs.keys().all(|k| k.ends_with("main.pyc")));

    let second = scheduler.run("compile", &options).await?;
    assert_eq!(second[0].status, TaskStatus::Cached);
    assert_eq!(shell.executed(), vec!["compile"]);
    Ok(())
}

#[tokio::test]
async fn task_without_command_or_dependencies_is_empty_not_alias() -> TestResult {
    let project = TempDir::new()?;
    let cache = TempDir::new()?;

    let registry = RegistryBuilder::new()
        .with_task(TaskBuilder::new("placeholder").build())
        .with_alias("group", &["placeholder"])
        .build();
    let shell = FakeShell::new();
    let mut scheduler = Scheduler::new(
        task_file_in(project.path(), registry),
        &settings(cache.path(), "linux-64"),
        shell.clone(),
    );

    let reports = scheduler.run("group", &quiet()).await?;

    assert_eq!(
        statuses(&reports),
        vec![
            ("placeholder", TaskStatus::Empty),
            ("group", TaskStatus::Alias)
        ]
    );
    assert!(shell.executed().is_empty());
    Ok(())
}
