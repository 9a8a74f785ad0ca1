use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use taskrun::errors::Result;
use taskrun::exec::{ShellBackend, ShellInvocation};

/// A fake shell backend that:
/// - records every invocation it receives
/// - exits 0 unless an exit code was configured for the task
/// - optionally runs a hook per invocation (e.g. to create output files)
#[derive(Clone, Default)]
pub struct FakeShell {
    invocations: Arc<Mutex<Vec<ShellInvocation>>>,
    exit_codes: HashMap<String, i32>,
    on_run: Option<Arc<dyn Fn(&ShellInvocation) + Send + Sync>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `task` exit with `code`.
    pub fn failing(mut self, task: &str, code: i32) -> Self {
        self.exit_codes.insert(task.to_string(), code);
        self
    }

    /// Run `hook` for every invocation, before reporting its exit code.
    pub fn on_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ShellInvocation) + Send + Sync + 'static,
    {
        self.on_run = Some(Arc::new(hook));
        self
    }

    /// Shared handle to the recorded invocations.
    pub fn recorded(&self) -> Arc<Mutex<Vec<ShellInvocation>>> {
        Arc::clone(&self.invocations)
    }

    /// Names of the tasks run so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.task.clone())
            .collect()
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.cmd.clone())
            .collect()
    }
}

impl ShellBackend for FakeShell {
    fn run<'a>(
        &'a mut self,
        invocation: &'a ShellInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(hook) = &self.on_run {
                hook(invocation);
            }
            self.invocations.lock().unwrap().push(invocation.clone());
            Ok(self.exit_codes.get(&invocation.task).copied().unwrap_or(0))
        })
    }
}
