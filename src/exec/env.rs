// src/exec/env.rs

use std::collections::BTreeMap;
use std::path::Path;

/// Ambient variables kept when a task runs with a clean environment.
pub const CLEAN_ENV_ALLOWLIST: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "TERM",
    "LANG",
    "SYSTEMROOT",
    "COMSPEC",
    "TEMP",
    "TMP",
];

/// Build the child process environment.
///
/// Starts from the full ambient environment, or only the allow-listed
/// variables when `clean` is set, then merges `extra` over it.
pub fn build_env(extra: &BTreeMap<String, String>, clean: bool) -> BTreeMap<String, String> {
    build_env_from(std::env::vars(), extra, clean)
}

/// [`build_env`] over an explicit ambient environment.
pub fn build_env_from<I>(
    ambient: I,
    extra: &BTreeMap<String, String>,
    clean: bool,
) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: BTreeMap<String, String> = ambient
        .into_iter()
        .filter(|(key, _)| !clean || CLEAN_ENV_ALLOWLIST.contains(&key.as_str()))
        .collect();
    env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// Prepend the executables directory of `prefix` to `PATH` in `env`.
pub fn prepend_prefix_path(env: &mut BTreeMap<String, String>, prefix: &Path) {
    let bin = if cfg!(windows) {
        prefix.join("Scripts")
    } else {
        prefix.join("bin")
    };
    let separator = if cfg!(windows) { ";" } else { ":" };

    let path = match env.get("PATH") {
        Some(existing) if !existing.is_empty() => {
            format!("{}{separator}{existing}", bin.to_string_lossy())
        }
        _ => bin.to_string_lossy().into_owned(),
    };
    env.insert("PATH".to_string(), path);
}
