// src/cache/fingerprint.rs

//! Persisted cache record and per-file fingerprints.
//!
//! The record is stored as JSON with stable field names:
//!
//! ```json
//! {
//!   "cmd_hash": "…",
//!   "env_hash": "…",
//!   "inputs":  { "/abs/src/main.c": { "mtime": 1700000000000000000, "size": 120, "content_hash": "…" } },
//!   "outputs": { "/abs/build/main.o": { "mtime": 1700000000000000000, "size": 900, "content_hash": "…" } }
//! }
//! ```
//!
//! Unknown fields are ignored on read so newer writers stay readable.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::hash::{compute_file_hash, hash_command, hash_env};

/// Fingerprints keyed by absolute path.
pub type FingerprintMap = BTreeMap<String, FileFingerprint>;

/// State of one file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime: u64,
    pub size: u64,
    pub content_hash: String,
}

/// Cheap metadata half of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub mtime: u64,
    pub size: u64,
}

impl FileStat {
    /// Stat `path`, returning `None` when it does not exist or is unreadable.
    pub fn read(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Some(Self {
            mtime,
            size: meta.len(),
        })
    }
}

impl FileFingerprint {
    pub fn stat(&self) -> FileStat {
        FileStat {
            mtime: self.mtime,
            size: self.size,
        }
    }
}

/// One task's cached result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cmd_hash: String,
    pub env_hash: String,
    #[serde(default)]
    pub inputs: FingerprintMap,
    #[serde(default)]
    pub outputs: FingerprintMap,
}

impl CacheEntry {
    /// Compute a full entry from the current state of the given files.
    pub fn compute(
        cmd: &str,
        env: &BTreeMap<String, String>,
        input_files: &[PathBuf],
        output_files: &[PathBuf],
    ) -> Result<Self> {
        Ok(Self {
            cmd_hash: hash_command(cmd),
            env_hash: hash_env(env),
            inputs: fingerprint_files(input_files)?,
            outputs: fingerprint_files(output_files)?,
        })
    }
}

/// Fingerprint every path that currently exists; missing paths are dropped.
pub fn fingerprint_files(paths: &[PathBuf]) -> Result<FingerprintMap> {
    let mut map = FingerprintMap::new();
    for path in paths {
        let Some(stat) = FileStat::read(path) else {
            debug!("skipping missing file {:?}", path);
            continue;
        };
        let content_hash = compute_file_hash(path)?;
        map.insert(
            path_key(path),
            FileFingerprint {
                mtime: stat.mtime,
                size: stat.size,
                content_hash,
            },
        );
    }
    Ok(map)
}

/// Compare cached fingerprints against the files as they are now.
///
/// The path sets must be identical. For each path, equal `(mtime, size)` is
/// taken as unchanged without hashing; otherwise the content hash decides.
pub fn files_match(cached: &FingerprintMap, current_paths: &[PathBuf]) -> bool {
    let current: BTreeMap<String, (&PathBuf, FileStat)> = current_paths
        .iter()
        .filter_map(|p| FileStat::read(p).map(|stat| (path_key(p), (p, stat))))
        .collect();

    if !cached.keys().eq(current.keys()) {
        debug!(
            cached = cached.len(),
            current = current.len(),
            "tracked file set changed"
        );
        return false;
    }

    for (key, (path, stat)) in &current {
        let Some(prev) = cached.get(key) else {
            return false;
        };
        if prev.stat() == *stat {
            continue;
        }
        match compute_file_hash(path) {
            Ok(hash) if hash == prev.content_hash => {
                debug!("metadata changed but content identical: {:?}", path);
            }
            Ok(_) => {
                debug!("content changed: {:?}", path);
                return false;
            }
            Err(err) => {
                debug!(error = %err, "could not hash {:?}", path);
                return false;
            }
        }
    }

    true
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
