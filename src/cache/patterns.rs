// src/cache/patterns.rs

//! Glob expansion for task inputs and outputs.
//!
//! Patterns are relative to a base directory and use `globset` syntax with
//! literal separators: `*` stays within one path component and `**` spans
//! any number of them (`src/**/*.rs` also matches `src/lib.rs`).
//!
//! Only regular files are returned. A pattern without glob characters that
//! names a directory (`dist` or `dist/`) expands to every file below it.
//!
//! Entries whose name starts with `.` are skipped while walking unless the
//! pattern spells the dot out: `**/*.py` ignores `.venv/` and `.hidden.py`,
//! while `.github/**/*.yml` and `**/.env` still match. A pattern without
//! `**` never walks deeper than its number of components.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Expand `patterns` against `base` into a sorted, de-duplicated list of
/// absolute file paths.
pub fn expand_globs(patterns: &[String], base: &Path) -> Result<Vec<PathBuf>> {
    let base = std::path::absolute(base)
        .with_context(|| format!("resolving glob base directory {:?}", base))?;

    let mut result = BTreeSet::new();
    for pattern in patterns {
        expand_one(pattern, &base, &mut result)?;
    }

    trace!(base = ?base, count = result.len(), "expanded glob patterns");
    Ok(result.into_iter().collect())
}

fn expand_one(pattern: &str, base: &Path, out: &mut BTreeSet<PathBuf>) -> Result<()> {
    let normalized = pattern.replace('\\', "/");
    let normalized = normalized.trim_end_matches('/');
    let normalized = normalized.strip_prefix("./").unwrap_or(normalized);
    if normalized.is_empty() {
        return Ok(());
    }

    let (literal, remainder) = split_literal_prefix(normalized);
    let root = if literal.is_empty() {
        base.to_path_buf()
    } else {
        base.join(literal)
    };

    if remainder.is_empty() {
        if root.is_file() {
            out.insert(root);
        } else if root.is_dir() {
            walk_files(&root, &WalkScope::visible(), |path| {
                out.insert(path.to_path_buf());
            });
        }
        return Ok(());
    }

    if !root.is_dir() {
        return Ok(());
    }

    let matcher = build_matcher(remainder)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;

    walk_files(&root, &WalkScope::for_pattern(remainder), |path| {
        if let Some(rel) = relative_str(&root, path) {
            if matcher.is_match(&rel) {
                out.insert(path.to_path_buf());
            }
        }
    });

    Ok(())
}

/// Split a pattern into its leading glob-free directory components and the
/// rest, e.g. `src/gen/**/*.rs` -> (`src/gen`, `**/*.rs`).
fn split_literal_prefix(pattern: &str) -> (&str, &str) {
    let mut literal_end = 0;
    for (idx, component) in component_spans(pattern) {
        if component.contains(GLOB_META) {
            return (pattern[..literal_end].trim_end_matches('/'), &pattern[idx..]);
        }
        literal_end = idx + component.len();
    }
    (pattern, "")
}

fn component_spans(pattern: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    pattern.split('/').map(move |component| {
        let start = offset;
        offset += component.len() + 1;
        (start, component)
    })
}

fn build_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    Ok(glob.compile_matcher())
}

/// Which entries a walk may enter, derived from the glob part of a pattern.
#[derive(Debug, Clone, Default)]
struct WalkScope {
    /// `None` for recursive (`**`) patterns.
    max_depth: Option<usize>,
    /// Per-depth permission to enter hidden entries (non-recursive patterns).
    hidden_at_depth: Vec<bool>,
    /// Recursive patterns: hidden directories / files allowed anywhere.
    hidden_dirs: bool,
    hidden_files: bool,
}

impl WalkScope {
    /// Every non-hidden entry at any depth.
    fn visible() -> Self {
        Self::default()
    }

    fn for_pattern(pattern: &str) -> Self {
        let components: Vec<&str> = pattern.split('/').collect();
        let dotted = |c: &&str| c.starts_with('.');

        if components.iter().any(|c| c.contains("**")) {
            let (last, dirs) = components.split_last().unwrap_or((&"", &[][..]));
            Self {
                max_depth: None,
                hidden_at_depth: Vec::new(),
                hidden_dirs: dirs.iter().any(dotted),
                hidden_files: dotted(last),
            }
        } else {
            Self {
                max_depth: Some(components.len()),
                hidden_at_depth: components.iter().map(dotted).collect(),
                hidden_dirs: false,
                hidden_files: false,
            }
        }
    }

    fn allows(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !is_hidden(entry) {
            return true;
        }
        match self.max_depth {
            Some(_) => self
                .hidden_at_depth
                .get(entry.depth() - 1)
                .copied()
                .unwrap_or(false),
            None if entry.file_type().is_dir() => self.hidden_dirs,
            None => self.hidden_files,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn walk_files(root: &Path, scope: &WalkScope, mut visit: impl FnMut(&Path)) {
    let mut walker = WalkDir::new(root);
    if let Some(depth) = scope.max_depth {
        walker = walker.max_depth(depth);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| scope.allows(e))
        .filter_map(|e| e.ok())
    {
        if entry.path().is_file() {
            visit(entry.path());
        }
    }
}

/// Path of `path` relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
