// src/dag/graph.rs

//! Dependency graph resolution.
//!
//! Turns a target task plus a registry into a linear execution order using a
//! post-order depth-first traversal. Nodes carry one of three states:
//! unvisited (absent from the state map), in progress (on the current DFS
//! stack) and finished (already emitted). Reaching an in-progress node means
//! the current stack contains a cycle, and the stack slice from that node
//! onwards is reported as the cycle path.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::errors::{Result, TaskrunError};
use crate::task::TaskRegistry;
use crate::types::TaskName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Finished,
}

/// Resolve the order in which `target` and its transitive dependencies run.
///
/// Every dependency precedes its dependents, each task appears once, and
/// tasks not reachable from `target` are left out. Siblings are visited in
/// declared `depends_on` order.
///
/// With `skip_deps`, only the existence of `target` is checked and the
/// result is `[target]`.
pub fn resolve_execution_order(
    target: &str,
    registry: &TaskRegistry,
    skip_deps: bool,
) -> Result<Vec<TaskName>> {
    if !registry.contains_key(target) {
        return Err(TaskrunError::task_not_found(target, registry.keys()));
    }

    if skip_deps {
        debug!(target, "skipping dependency resolution");
        return Ok(vec![target.to_string()]);
    }

    let mut traversal = Traversal {
        registry,
        state: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
    };
    traversal.visit(target)?;

    debug!(target, order = ?traversal.order, "resolved execution order");
    Ok(traversal.order)
}

struct Traversal<'a> {
    registry: &'a TaskRegistry,
    state: HashMap<&'a str, VisitState>,
    /// Current DFS path, used to report cycles.
    stack: Vec<&'a str>,
    order: Vec<TaskName>,
}

impl<'a> Traversal<'a> {
    fn visit(&mut self, name: &str) -> Result<()> {
        let Some((key, task)) = self.registry.get_key_value(name) else {
            return Err(TaskrunError::task_not_found(name, self.registry.keys()));
        };
        let key = key.as_str();

        match self.state.get(key) {
            Some(VisitState::Finished) => return Ok(()),
            Some(VisitState::InProgress) => return Err(self.cycle_error(key)),
            None => {}
        }

        trace!(task = key, depth = self.stack.len(), "descending");
        self.state.insert(key, VisitState::InProgress);
        self.stack.push(key);

        for dep in task.dependency_names() {
            self.visit(dep)?;
        }

        self.stack.pop();
        self.state.insert(key, VisitState::Finished);
        self.order.push(key.to_string());
        Ok(())
    }

    /// Build the cycle path from the first occurrence of `repeated` on the
    /// stack back to `repeated` itself, e.g. `a -> b -> a`.
    fn cycle_error(&self, repeated: &str) -> TaskrunError {
        let start = self
            .stack
            .iter()
            .position(|name| *name == repeated)
            .unwrap_or(0);

        let mut cycle: Vec<TaskName> = self.stack[start..].iter().map(|s| s.to_string()).collect();
        cycle.push(repeated.to_string());

        TaskrunError::CyclicDependency { cycle }
    }
}
