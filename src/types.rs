// src/types.rs

//! Small shared types: task names and platform identifiers.

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Names starting with this character are hidden from listings.
pub const HIDDEN_PREFIX: char = '_';

/// Platform identifier of the host, in `<os>-<arch>` form.
///
/// The identifiers follow the conventional subdir naming used by package
/// managers: `linux-64`, `linux-aarch64`, `osx-64`, `osx-arm64`, `win-64`,
/// `win-arm64`. Unknown combinations fall back to `<os>-<arch>` using the
/// Rust target names.
pub fn current_platform() -> String {
    platform_identifier(std::env::consts::OS, std::env::consts::ARCH)
}

/// Map a Rust `(os, arch)` pair onto a platform identifier.
pub fn platform_identifier(os: &str, arch: &str) -> String {
    let os = match os {
        "macos" => "osx",
        "windows" => "win",
        other => other,
    };

    let arch = match (os, arch) {
        (_, "x86_64") => "64",
        (_, "x86") => "32",
        ("osx", "aarch64") | ("win", "aarch64") => "arm64",
        (_, "powerpc64") => "ppc64le",
        (_, other) => other,
    };

    format!("{os}-{arch}")
}
