// src/config/settings.rs

//! Process-wide settings resolved once at startup.
//!
//! Priority for the cache directory:
//! 1. `--cache-dir` CLI flag (if provided)
//! 2. `TASKRUN_CACHE_DIR` environment variable
//! 3. the platform cache directory (`~/.cache/taskrun` on Linux)
//! 4. `<temp>/taskrun-cache`
//!
//! The platform defaults to the host's identifier unless `--platform` is
//! given.

use std::path::PathBuf;

use crate::types::current_platform;

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "TASKRUN_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root under which per-project cache directories are created.
    pub cache_dir: PathBuf,
    /// Platform identifier used to pick task overrides.
    pub platform: String,
}

impl Settings {
    pub fn resolve(cli_cache_dir: Option<PathBuf>, cli_platform: Option<String>) -> Self {
        let cache_dir = cli_cache_dir
            .or_else(|| {
                std::env::var_os(CACHE_DIR_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(default_cache_dir);

        Self {
            cache_dir,
            platform: cli_platform.unwrap_or_else(current_platform),
        }
    }
}

/// Platform-appropriate cache root for taskrun.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("taskrun"))
        .unwrap_or_else(|| std::env::temp_dir().join("taskrun-cache"))
}
