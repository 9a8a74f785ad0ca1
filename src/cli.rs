// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskrun",
    version,
    about = "Run project tasks in dependency order, skipping ones whose inputs are unchanged.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task file.
    ///
    /// Default: the nearest `taskrun.toml` in the current directory or one of
    /// its parents.
    #[arg(long, short = 'f', global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKRUN_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Directory for cached task fingerprints.
    ///
    /// If omitted, `TASKRUN_CACHE_DIR` or the platform cache directory is used.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Platform identifier used to select task overrides (e.g. `linux-64`).
    #[arg(long, global = true, value_name = "PLATFORM")]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a task and its dependencies.
    Run(RunArgs),
    /// List available tasks.
    List(ListArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Name of the task to run.
    pub task: String,

    /// Arguments passed to the task.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,

    /// Run only the named task, not its dependencies.
    #[arg(long)]
    pub skip_deps: bool,

    /// Run every task with a minimal environment.
    #[arg(long)]
    pub clean_env: bool,

    /// Override the working directory of the tasks.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Environment prefix to run the tasks in.
    #[arg(long, short = 'p', value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Print the commands that would run without executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress status lines.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Include hidden tasks (names starting with `_`).
    #[arg(long)]
    pub all: bool,

    /// Print the task registry as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
