// src/cache/store.rs

//! On-disk cache layout and the hit/miss decision.
//!
//! ```text
//! <cache_root>/<project_key>/<task_name>.json
//! ```
//!
//! `project_key` is a truncated blake3 digest of the canonical project root,
//! so the same project always maps to the same directory regardless of the
//! invocation directory. There is no locking; concurrent runners against the
//! same project and task may race on the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cache::fingerprint::{files_match, CacheEntry};
use crate::cache::hash::{hash_command, hash_env};
use crate::cache::patterns::expand_globs;
use crate::errors::Result;

const PROJECT_KEY_LEN: usize = 16;

/// Everything the cache needs to know about one task invocation.
#[derive(Debug, Clone, Copy)]
pub struct CacheRequest<'a> {
    pub project_root: &'a Path,
    pub task_name: &'a str,
    /// Effective, fully rendered command.
    pub cmd: &'a str,
    pub env: &'a BTreeMap<String, String>,
    pub inputs: &'a [String],
    pub outputs: &'a [String],
    /// Base directory for glob expansion.
    pub cwd: &'a Path,
}

/// Fingerprint cache rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct TaskCache {
    root: PathBuf,
}

impl TaskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stable key for a project root.
    ///
    /// The root is canonicalized first (falling back to an absolute path
    /// when it does not exist), so symlinked and relative spellings of the
    /// same directory share a key.
    pub fn project_key(project_root: &Path) -> String {
        let resolved = fs::canonicalize(project_root)
            .or_else(|_| std::path::absolute(project_root))
            .unwrap_or_else(|_| project_root.to_path_buf());
        let digest = blake3::hash(resolved.to_string_lossy().as_bytes()).to_hex();
        digest.as_str()[..PROJECT_KEY_LEN].to_string()
    }

    pub fn project_dir(&self, project_root: &Path) -> PathBuf {
        self.root.join(Self::project_key(project_root))
    }

    pub fn cache_file(&self, project_root: &Path, task_name: &str) -> PathBuf {
        self.project_dir(project_root)
            .join(format!("{task_name}.json"))
    }

    /// Read the stored entry for a task.
    ///
    /// Missing, unreadable or malformed files all yield `None`.
    pub fn load_entry(&self, project_root: &Path, task_name: &str) -> Option<CacheEntry> {
        let path = self.cache_file(project_root, task_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(task = task_name, error = %err, "no readable cache entry");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(task = task_name, path = ?path, error = %err, "ignoring malformed cache entry");
                None
            }
        }
    }

    /// True when the task's previous result can be reused.
    ///
    /// Any failure while reading or evaluating the cache counts as a miss.
    pub fn is_cached(&self, req: &CacheRequest<'_>) -> bool {
        let Some(cached) = self.load_entry(req.project_root, req.task_name) else {
            return false;
        };

        let (input_files, output_files) = match (
            expand_globs(req.inputs, req.cwd),
            expand_globs(req.outputs, req.cwd),
        ) {
            (Ok(inputs), Ok(outputs)) => (inputs, outputs),
            (Err(err), _) | (_, Err(err)) => {
                warn!(task = req.task_name, error = %err, "glob expansion failed; treating as cache miss");
                return false;
            }
        };

        if cached.cmd_hash != hash_command(req.cmd) {
            debug!(task = req.task_name, "cache miss: command changed");
            return false;
        }
        if cached.env_hash != hash_env(req.env) {
            debug!(task = req.task_name, "cache miss: environment changed");
            return false;
        }
        if !files_match(&cached.inputs, &input_files) {
            debug!(task = req.task_name, "cache miss: inputs changed");
            return false;
        }
        if !files_match(&cached.outputs, &output_files) {
            debug!(task = req.task_name, "cache miss: outputs changed");
            return false;
        }

        debug!(task = req.task_name, "cache hit");
        true
    }

    /// Fingerprint the current state and replace the task's cache entry.
    pub fn save_cache(&self, req: &CacheRequest<'_>) -> Result<()> {
        let input_files = expand_globs(req.inputs, req.cwd)?;
        let output_files = expand_globs(req.outputs, req.cwd)?;
        let entry = CacheEntry::compute(req.cmd, req.env, &input_files, &output_files)?;

        let path = self.cache_file(req.project_root, req.task_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache directory at {:?}", parent))?;
        }

        // Write-then-rename so readers never see a partial entry.
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(&tmp, json).with_context(|| format!("writing cache file at {:?}", tmp))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replacing cache file at {:?}", path))?;

        info!(
            task = req.task_name,
            inputs = entry.inputs.len(),
            outputs = entry.outputs.len(),
            "stored task fingerprints"
        );
        Ok(())
    }
}
