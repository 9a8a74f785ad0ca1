#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use taskrun::config::{Settings, TaskFile};
use taskrun::task::{Task, TaskArg, TaskCommand, TaskDependency, TaskOverride, TaskRegistry};

/// Builder for `Task` to simplify test setup.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: Task::new(name),
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(TaskCommand::Single(cmd.to_string()));
        self
    }

    pub fn tokens(mut self, tokens: &[&str]) -> Self {
        self.task.cmd = Some(TaskCommand::Tokens(
            tokens.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.task.depends_on.push(TaskDependency::new(dep));
        self
    }

    pub fn depends_on_with_args(mut self, dep: &str, args: &[&str]) -> Self {
        self.task.depends_on.push(TaskDependency {
            task: dep.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            environment: None,
        });
        self
    }

    pub fn arg(mut self, name: &str) -> Self {
        self.task.args.push(TaskArg::required(name));
        self
    }

    pub fn arg_with_default(mut self, name: &str, default: &str) -> Self {
        self.task.args.push(TaskArg::with_default(name, default));
        self
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.task.cwd = Some(dir.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn input(mut self, pattern: &str) -> Self {
        self.task.inputs.push(pattern.to_string());
        self
    }

    pub fn output(mut self, pattern: &str) -> Self {
        self.task.outputs.push(pattern.to_string());
        self
    }

    pub fn clean_env(mut self, val: bool) -> Self {
        self.task.clean_env = val;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.task.description = Some(desc.to_string());
        self
    }

    pub fn platform(mut self, platform: &str, entry: TaskOverride) -> Self {
        self.task
            .platforms
            .get_or_insert_with(BTreeMap::new)
            .insert(platform.to_string(), entry);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for a `TaskRegistry`.
#[derive(Default)]
pub struct RegistryBuilder {
    tasks: TaskRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.insert(task.name.clone(), task);
        self
    }

    /// Shorthand for a task with a command and plain dependencies.
    pub fn with(self, name: &str, cmd: &str, deps: &[&str]) -> Self {
        let builder = deps
            .iter()
            .fold(TaskBuilder::new(name).cmd(cmd), |b, dep| b.depends_on(dep));
        self.with_task(builder.build())
    }

    /// Shorthand for a command-less task that only groups dependencies.
    pub fn with_alias(self, name: &str, deps: &[&str]) -> Self {
        let builder = deps
            .iter()
            .fold(TaskBuilder::new(name), |b, dep| b.depends_on(dep));
        self.with_task(builder.build())
    }

    pub fn build(self) -> TaskRegistry {
        self.tasks
    }
}

/// A `TaskFile` rooted at `project_root`, as if loaded from
/// `<project_root>/taskrun.toml`.
pub fn task_file_in(project_root: &Path, tasks: TaskRegistry) -> TaskFile {
    TaskFile {
        path: project_root.join("taskrun.toml"),
        project_root: project_root.to_path_buf(),
        tasks,
    }
}

/// Settings pointing at an explicit cache directory and platform.
pub fn settings(cache_dir: &Path, platform: &str) -> Settings {
    Settings {
        cache_dir: cache_dir.to_path_buf(),
        platform: platform.to_string(),
    }
}

/// Write `contents` to `<dir>/taskrun.toml` and return the path.
pub fn write_task_file(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("taskrun.toml");
    std::fs::write(&path, contents).expect("failed to write task file");
    path
}
