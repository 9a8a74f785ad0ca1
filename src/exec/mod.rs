// src/exec/mod.rs

//! Process execution layer.
//!
//! The scheduler hands each runnable task to a [`ShellBackend`] and only
//! looks at the exit code it returns.
//!
//! - [`backend`] defines the `ShellBackend` trait and the invocation type.
//! - [`env`] builds the child environment (full or clean allow-list).
//! - [`shell`] is the production backend running commands through the
//!   platform shell with `tokio::process`.

pub mod backend;
pub mod env;
pub mod shell;

pub use backend::{ShellBackend, ShellInvocation};
pub use env::{build_env, CLEAN_ENV_ALLOWLIST};
pub use shell::SubprocessShell;
