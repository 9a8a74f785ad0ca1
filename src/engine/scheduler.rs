// src/engine/scheduler.rs

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::cache::{CacheRequest, TaskCache};
use crate::config::{Settings, TaskFile};
use crate::dag::resolve_execution_order;
use crate::engine::{RunOptions, TaskReport, TaskStatus};
use crate::errors::{Result, TaskrunError};
use crate::exec::{ShellBackend, ShellInvocation};
use crate::task::{resolve_registry_for_platform, Task, TaskDependency, TaskRegistry};
use crate::template::{render_command, render_list, resolve_task_args, TemplateContext};

/// Runs tasks from one task file, sequentially, with caching.
///
/// Owns the loaded task file, the cache and the shell backend. Settings are
/// resolved by the caller and passed in once.
pub struct Scheduler<S: ShellBackend> {
    task_file: TaskFile,
    platform: String,
    cache: TaskCache,
    shell: S,
}

impl<S: ShellBackend> Scheduler<S> {
    pub fn new(task_file: TaskFile, settings: &Settings, shell: S) -> Self {
        Self {
            task_file,
            platform: settings.platform.clone(),
            cache: TaskCache::new(&settings.cache_dir),
            shell,
        }
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Registry with every task resolved for the configured platform.
    pub fn effective_tasks(&self) -> TaskRegistry {
        resolve_registry_for_platform(&self.task_file.tasks, &self.platform)
    }

    /// The order `target` would run in, without running anything.
    pub fn plan(&self, target: &str, skip_deps: bool) -> Result<Vec<String>> {
        resolve_execution_order(target, &self.effective_tasks(), skip_deps)
    }

    /// Run `target` and, unless `skip_deps` is set, its dependencies.
    ///
    /// Stops at the first failing task; no cache entry is written for it and
    /// the remaining tasks are not started.
    pub async fn run(&mut self, target: &str, options: &RunOptions) -> Result<Vec<TaskReport>> {
        let effective = self.effective_tasks();
        let order = resolve_execution_order(target, &effective, options.skip_deps)?;
        let edges = dependency_edges(&order, &effective);
        let builtins = TemplateContext::builtin(&self.platform, Some(&self.task_file.path));

        info!(target, platform = %self.platform, tasks = order.len(), "starting run");

        let mut reports = Vec::with_capacity(order.len());
        for name in &order {
            let task = effective
                .get(name)
                .ok_or_else(|| TaskrunError::task_not_found(name, effective.keys()))?;

            let (args, environment) = if name == target {
                (options.args.as_slice(), task.default_environment.clone())
            } else {
                match edges.get(name.as_str()) {
                    Some(edge) => (
                        edge.args.as_slice(),
                        edge.environment.clone().or_else(|| task.default_environment.clone()),
                    ),
                    None => (&[][..], task.default_environment.clone()),
                }
            };

            let report = self
                .run_task(task, args, environment, &builtins, options)
                .await?;
            reports.push(report);
        }

        Ok(reports)
    }

    async fn run_task(
        &mut self,
        task: &Task,
        args: &[String],
        environment: Option<String>,
        builtins: &TemplateContext,
        options: &RunOptions,
    ) -> Result<TaskReport> {
        let Some(cmd) = &task.cmd else {
            let status = if task.is_alias() {
                TaskStatus::Alias
            } else {
                TaskStatus::Empty
            };
            debug!(task = %task.name, ?status, "no command; nothing to execute");
            return Ok(report(task, status, None));
        };

        let bound = resolve_task_args(task, args)?;
        let ctx = builtins.with_args(&bound);
        let rendered = render_command(&task.name, cmd, &ctx)?;
        let inputs = render_list(&task.name, &task.inputs, &ctx)?;
        let outputs = render_list(&task.name, &task.outputs, &ctx)?;
        let cwd = self.working_dir(task, options);

        if options.dry_run {
            announce(options, format!("[dry-run] {}: {}", task.name, rendered));
            return Ok(report(task, TaskStatus::DryRun, Some(rendered)));
        }

        let cacheable = task.is_cacheable();
        let request = CacheRequest {
            project_root: &self.task_file.project_root,
            task_name: &task.name,
            cmd: &rendered,
            env: &task.env,
            inputs: &inputs,
            outputs: &outputs,
            cwd: &cwd,
        };

        if cacheable && self.cache.is_cached(&request) {
            info!(task = %task.name, "cache hit; skipping");
            announce(options, format!("[cached] {}", task.name));
            return Ok(report(task, TaskStatus::Cached, Some(rendered)));
        }

        announce(options, format!("[run] {}: {}", task.name, rendered));

        let invocation = ShellInvocation {
            task: task.name.clone(),
            cmd: rendered.clone(),
            env: task.env.clone(),
            cwd: cwd.clone(),
            clean_env: options.clean_env || task.clean_env,
            prefix: options.prefix.clone(),
            environment,
        };
        let exit_code = self.shell.run(&invocation).await?;

        if exit_code != 0 {
            error!(task = %task.name, exit_code, "task failed");
            return Err(TaskrunError::TaskExecution {
                task: task.name.clone(),
                exit_code,
            });
        }

        if cacheable {
            self.cache.save_cache(&request)?;
        }

        Ok(report(task, TaskStatus::Ran, Some(rendered)))
    }

    /// `--cwd` wins, then the task's own `cwd` (relative to the project
    /// root), then the project root.
    fn working_dir(&self, task: &Task, options: &RunOptions) -> PathBuf {
        if let Some(dir) = &options.cwd {
            return std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
        }
        match &task.cwd {
            Some(dir) => self.task_file.project_root.join(dir),
            None => self.task_file.project_root.clone(),
        }
    }
}

/// For every task in `order`, the first dependency edge that points at it.
///
/// Edges carry the argument values and environment tag a dependent passes
/// to its dependency.
fn dependency_edges<'a>(
    order: &[String],
    registry: &'a TaskRegistry,
) -> HashMap<&'a str, &'a TaskDependency> {
    let mut edges = HashMap::new();
    for name in order {
        let Some(task) = registry.get(name) else {
            continue;
        };
        for dep in &task.depends_on {
            edges.entry(dep.task.as_str()).or_insert(dep);
        }
    }
    edges
}

fn report(task: &Task, status: TaskStatus, cmd: Option<String>) -> TaskReport {
    TaskReport {
        name: task.name.clone(),
        status,
        cmd,
    }
}

fn announce(options: &RunOptions, line: String) {
    if !options.quiet {
        println!("{line}");
    }
}
