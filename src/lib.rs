// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod template;
pub mod types;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command, ListArgs, RunArgs};
use crate::config::{discover_task_file, load_task_file, Settings, TaskFile};
use crate::engine::{RunOptions, Scheduler};
use crate::errors::Result;
use crate::exec::SubprocessShell;
use crate::task::Task;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings resolution
/// - task file discovery and loading
/// - the `run` and `list` subcommands
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = Settings::resolve(args.cache_dir.clone(), args.platform.clone());
    debug!(?settings, "resolved settings");

    let task_file = locate_and_load(args.file.as_deref())?;
    info!(
        path = ?task_file.path,
        tasks = task_file.tasks.len(),
        "loaded task file"
    );

    match args.command {
        Command::Run(run_args) => run_task(task_file, &settings, run_args).await,
        Command::List(list_args) => list_tasks(&task_file, &settings, &list_args),
    }
}

fn locate_and_load(file: Option<&std::path::Path>) -> Result<TaskFile> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            discover_task_file(&cwd)?
        }
    };
    load_task_file(&path)
}

async fn run_task(task_file: TaskFile, settings: &Settings, args: RunArgs) -> Result<()> {
    let options = RunOptions {
        args: args.args,
        skip_deps: args.skip_deps,
        dry_run: args.dry_run,
        quiet: args.quiet,
        clean_env: args.clean_env,
        cwd: args.cwd,
        prefix: args.prefix,
    };

    let mut scheduler = Scheduler::new(task_file, settings, SubprocessShell::new());
    let reports = scheduler.run(&args.task, &options).await?;

    debug!(?reports, "run complete");
    Ok(())
}

fn list_tasks(task_file: &TaskFile, settings: &Settings, args: &ListArgs) -> Result<()> {
    let effective = task::resolve_registry_for_platform(&task_file.tasks, &settings.platform);
    let visible: Vec<&Task> = effective
        .values()
        .filter(|task| args.all || !task.is_hidden())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No tasks defined in {}", task_file.path.display());
        return Ok(());
    }

    let width = visible.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for task in visible {
        match (&task.description, &task.cmd) {
            (Some(desc), _) => println!("  {:width$}  {desc}", task.name),
            (None, Some(cmd)) => println!("  {:width$}  {cmd}", task.name),
            (None, None) => {
                let deps = task.dependency_names().collect::<Vec<_>>().join(", ");
                println!("  {:width$}  (alias: {deps})", task.name)
            }
        }
    }
    Ok(())
}
