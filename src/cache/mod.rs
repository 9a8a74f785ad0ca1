// src/cache/mod.rs

//! Fingerprint cache.
//!
//! Decides whether a task's previous result can be reused and persists new
//! results after successful runs.
//!
//! - [`hash`] computes blake3 digests for commands, environments and files.
//! - [`patterns`] expands input/output glob patterns into concrete files.
//! - [`fingerprint`] defines the persisted record and file fingerprints.
//! - [`store`] owns the on-disk layout and the hit/miss decision.

pub mod fingerprint;
pub mod hash;
pub mod patterns;
pub mod store;

pub use fingerprint::{CacheEntry, FileFingerprint};
pub use hash::{compute_file_hash, hash_command, hash_env};
pub use patterns::expand_globs;
pub use store::{CacheRequest, TaskCache};
