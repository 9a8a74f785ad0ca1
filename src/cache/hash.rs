// src/cache/hash.rs

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;

const CHUNK_SIZE: usize = 8192;

/// Hash a file's contents, streaming it in fixed-size chunks.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = File::open(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Hash the effective command string.
pub fn hash_command(cmd: &str) -> String {
    blake3::hash(cmd.as_bytes()).to_hex().to_string()
}

/// Hash an environment mapping in canonical (key-sorted) form.
///
/// The mapping is encoded as a JSON object; `BTreeMap` keeps the keys
/// sorted, so equal mappings always produce equal digests.
pub fn hash_env(env: &BTreeMap<String, String>) -> String {
    let canonical = serde_json::to_string(env).unwrap_or_default();
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}
